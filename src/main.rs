//! rosterd entry point
//!
//! Parses the command line, runs the selected command and prints failures
//! through [`user_friendly_error`] before exiting with status 1.

use anyhow::Result;
use clap::Parser;
use rosterd::cli;
use rosterd::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may come from a local .env file; real environment variables win.
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
