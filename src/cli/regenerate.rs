//! `rosterd regenerate`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::CredentialArgs;
use super::common::gateway_from_args;

#[derive(Args, Debug)]
pub struct RegenerateCommand {
    /// Write the rendered snapshot to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RegenerateCommand {
    pub async fn execute(self, config_path: &Path, credentials: &CredentialArgs) -> Result<()> {
        let gateway = gateway_from_args(config_path, credentials).await?;
        let served = gateway.regenerate().await?;

        match self.output {
            Some(path) => {
                fs::write(&path, &served.body)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "{} Snapshot regenerated ({} bytes) -> {}",
                    "✓".green(),
                    served.body.len(),
                    path.display()
                );
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&served.body).await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }
}
