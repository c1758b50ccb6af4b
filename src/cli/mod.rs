//! Command-line interface for rosterd.
//!
//! # Commands
//!
//! - `serve` - Run the HTTP entry point
//! - `regenerate` - Rebuild the snapshot now and overwrite the cached copy
//! - `show` - Print the snapshot, building it only on a cache miss
//! - `config check` - Validate configuration and print the effective settings
//!
//! # Global Options
//!
//! - `--config <PATH>` - Settings file (default `rosterd.toml`)
//! - `--verbose` / `--quiet` - Debug output, or warnings and errors only
//! - `--log-format <text|json>` - Log line format
//!
//! Credentials are taken from flags or their environment variables:
//! `NOTION_INTEGRATION_KEY`, `NOTION_DATABASE_ID`, `STORAGE_URL` and
//! `STORAGE_SERVICE_KEY`. A `.env` file in the working directory is loaded first.
//!
//! # Examples
//!
//! ```bash
//! rosterd serve --listen 0.0.0.0:8080
//! rosterd --verbose regenerate --output committee.html
//! rosterd config check --config deploy/rosterd.toml
//! ```

mod common;
mod config;
mod regenerate;
mod serve;
mod show;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Credentials;
use crate::constants::DEFAULT_CONFIG_FILE;
use crate::core::RosterError;

/// Committee roster snapshot service.
#[derive(Parser, Debug)]
#[command(
    name = "rosterd",
    about = "Aggregate the committee roster from Notion into a cached HTML snapshot",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the settings file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE, env = "ROSTERD_CONFIG")]
    config: PathBuf,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(flatten)]
    credentials: CredentialArgs,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Secrets and endpoints; each flag falls back to its environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Notion integration token.
    #[arg(long, global = true, env = "NOTION_INTEGRATION_KEY", hide_env_values = true)]
    notion_token: Option<String>,

    /// Identifier of the root Notion database.
    #[arg(long, global = true, env = "NOTION_DATABASE_ID")]
    root_collection: Option<String>,

    /// Blob-store base URL.
    #[arg(long, global = true, env = "STORAGE_URL")]
    storage_url: Option<String>,

    /// Blob-store service key.
    #[arg(long, global = true, env = "STORAGE_SERVICE_KEY", hide_env_values = true)]
    storage_key: Option<String>,
}

impl CredentialArgs {
    fn resolve(&self) -> Result<Credentials, RosterError> {
        Credentials::from_parts(
            self.notion_token.clone(),
            self.root_collection.clone(),
            self.storage_url.clone(),
            self.storage_key.clone(),
        )
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the snapshot over HTTP.
    Serve(serve::ServeCommand),

    /// Rebuild the snapshot and overwrite the cached copy.
    Regenerate(regenerate::RegenerateCommand),

    /// Print the snapshot, building it only if nothing is cached.
    Show(show::ShowCommand),

    /// Inspect configuration.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Set up logging and run the selected command.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.log_level(), self.log_format);

        match self.command {
            Commands::Serve(cmd) => cmd.execute(&self.config, &self.credentials).await,
            Commands::Regenerate(cmd) => cmd.execute(&self.config, &self.credentials).await,
            Commands::Show(cmd) => cmd.execute(&self.config, &self.credentials).await,
            Commands::Config(cmd) => cmd.execute(&self.config, &self.credentials).await,
        }
    }

    /// Default filter directive for the chosen verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "rosterd=debug,info"
        } else if self.quiet {
            "warn"
        } else {
            "rosterd=info,warn"
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    // A subscriber may already be installed when running under a test harness.
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::parse_from(["rosterd", "--verbose", "show"]);
        assert_eq!(cli.log_level(), "rosterd=debug,info");

        let cli = Cli::parse_from(["rosterd", "show", "--quiet"]);
        assert_eq!(cli.log_level(), "warn");

        assert!(Cli::try_parse_from(["rosterd", "-v", "-q", "show"]).is_err());
    }

    #[test]
    fn test_credential_flags() {
        let cli = Cli::parse_from([
            "rosterd",
            "--notion-token",
            "secret",
            "--root-collection",
            "db",
            "--storage-url",
            "https://store.example/",
            "--storage-key",
            "key",
            "config",
            "check",
        ]);
        let credentials = cli.credentials.resolve().unwrap();
        assert_eq!(credentials.root_collection_id, "db");
        assert_eq!(credentials.storage_url, "https://store.example");
    }

    #[test]
    fn test_log_format_and_config_path() {
        let cli = Cli::parse_from(["rosterd", "--log-format", "json", "-c", "x.toml", "show"]);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }
}
