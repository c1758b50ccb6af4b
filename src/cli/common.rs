//! Wiring shared by the commands: configuration loading and service construction.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::CredentialArgs;
use crate::config::{RosterConfig, Settings};
use crate::gateway::SnapshotGateway;
use crate::media::{HttpMediaFetcher, MediaSynchronizer};
use crate::notion::NotionClient;
use crate::render::SnapshotRenderer;
use crate::roster::RosterPipeline;
use crate::storage::{BlobStore, StorageClient};

/// Load settings from `config_path` and resolve credentials.
pub async fn load_config(config_path: &Path, credentials: &CredentialArgs) -> Result<RosterConfig> {
    let settings = Settings::load(config_path).await?;
    let credentials = credentials.resolve()?;
    debug!("Loaded configuration: {:?}", credentials);
    Ok(RosterConfig::new(settings, credentials))
}

/// Build the cache gateway and the pipeline behind it from configuration.
pub async fn build_gateway(config: &RosterConfig) -> Result<SnapshotGateway> {
    let RosterConfig {
        settings,
        credentials,
    } = config;

    let store: Arc<dyn BlobStore> = Arc::new(
        StorageClient::new(&credentials.storage_url, &credentials.storage_key, &settings.http)
            .context("Failed to create storage client")?,
    );
    let source = Arc::new(
        NotionClient::new(&credentials.notion_token, &settings.http)
            .context("Failed to create Notion client")?,
    );
    let fetcher = Arc::new(
        HttpMediaFetcher::new(settings.http.timeout()).context("Failed to create media fetcher")?,
    );
    let renderer = SnapshotRenderer::from_settings(&settings.render).await?;

    let media = MediaSynchronizer::new(
        Arc::clone(&store),
        fetcher,
        &settings.storage.media_bucket,
        &settings.storage.media_prefix,
    );
    let pipeline = RosterPipeline::new(
        source,
        media,
        renderer,
        &credentials.root_collection_id,
        settings,
    );

    Ok(SnapshotGateway::new(
        store,
        Arc::new(pipeline),
        &settings.storage.snapshot_bucket,
        &settings.storage.snapshot_key,
    ))
}

/// Load configuration and build the gateway in one step.
pub async fn gateway_from_args(
    config_path: &Path,
    credentials: &CredentialArgs,
) -> Result<SnapshotGateway> {
    let config = load_config(config_path, credentials).await?;
    build_gateway(&config).await
}
