//! `rosterd serve`

use anyhow::{Context, Result};
use clap::Args;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::CredentialArgs;
use super::common::gateway_from_args;
use crate::constants::DEFAULT_LISTEN_ADDR;
use crate::server;

#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on.
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR, env = "ROSTERD_LISTEN")]
    listen: SocketAddr,
}

impl ServeCommand {
    pub async fn execute(self, config_path: &Path, credentials: &CredentialArgs) -> Result<()> {
        let gateway = Arc::new(gateway_from_args(config_path, credentials).await?);
        let listener = TcpListener::bind(self.listen)
            .await
            .with_context(|| format!("Failed to bind {}", self.listen))?;

        server::run(listener, gateway, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server stopped unexpectedly")
    }
}
