//! `rosterd config`

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

use super::CredentialArgs;
use super::common::load_config;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommand {
    /// Validate settings and credentials, then print the effective settings.
    Check,
}

impl ConfigCommand {
    pub async fn execute(self, config_path: &Path, credentials: &CredentialArgs) -> Result<()> {
        match self.command {
            ConfigSubcommand::Check => check(config_path, credentials).await,
        }
    }
}

async fn check(config_path: &Path, credentials: &CredentialArgs) -> Result<()> {
    let config = load_config(config_path, credentials).await?;
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", config_path.display())
    };

    println!("✅ Configuration is valid");
    println!("{} {}", "Settings:".bold(), source);
    println!("{}", toml::to_string_pretty(&config.settings)?);

    let creds = &config.credentials;
    println!("{}", "Credentials:".bold());
    println!("  NOTION_INTEGRATION_KEY = {}", "<set>".green());
    println!("  NOTION_DATABASE_ID     = {}", creds.root_collection_id);
    println!("  STORAGE_URL            = {}", creds.storage_url);
    println!("  STORAGE_SERVICE_KEY    = {}", "<set>".green());
    Ok(())
}
