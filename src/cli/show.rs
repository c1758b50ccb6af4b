//! `rosterd show`

use anyhow::Result;
use clap::Args;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::CredentialArgs;
use super::common::gateway_from_args;

/// Serve the snapshot once, to stdout.
#[derive(Args, Debug)]
pub struct ShowCommand {}

impl ShowCommand {
    pub async fn execute(self, config_path: &Path, credentials: &CredentialArgs) -> Result<()> {
        let gateway = gateway_from_args(config_path, credentials).await?;
        let served = gateway.serve().await?;
        info!("Snapshot served from cache: {}", served.cache);

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&served.body).await?;
        stdout.flush().await?;
        Ok(())
    }
}
