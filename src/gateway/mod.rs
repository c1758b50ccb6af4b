//! Cache-first access to the rendered snapshot.
//!
//! ```text
//! CHECK_CACHE ──hit──▶ SERVE_CACHED
//!      │
//!     miss ──▶ RUN_PIPELINE ──▶ PERSIST ──▶ SERVE_FRESH
//! ```
//!
//! A cached snapshot is returned byte-for-byte without touching the pipeline.
//! On a miss the pipeline runs to completion before anything is written, so a
//! failed or cancelled run never leaves a partial snapshot behind. Persisting
//! is best effort: a write failure is logged and the fresh render is served.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::constants::SNAPSHOT_CONTENT_TYPE;
use crate::core::RosterError;
use crate::storage::{self, BlobStore};

/// Produces a fresh snapshot document.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn build(&self) -> Result<String, RosterError>;
}

/// How a served snapshot was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Rebuilt on an explicit trigger, without consulting the cache.
    Regenerated,
}

impl CacheStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Regenerated => "regenerated",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot ready to return to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub body: Bytes,
    pub cache: CacheStatus,
}

/// Serves the snapshot from the blob store, rebuilding it when absent.
pub struct SnapshotGateway {
    store: Arc<dyn BlobStore>,
    source: Arc<dyn SnapshotSource>,
    bucket: String,
    key: String,
}

impl SnapshotGateway {
    pub fn new(
        store: Arc<dyn BlobStore>,
        source: Arc<dyn SnapshotSource>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Return the cached snapshot, or build, persist and return a fresh one.
    ///
    /// A cache read failure is logged and handled as a miss.
    ///
    /// # Errors
    ///
    /// Returns the pipeline's error on a miss; nothing is written in that case.
    pub async fn serve(&self) -> Result<Served, RosterError> {
        let exists = match self.store.get(&self.bucket, &self.key).await {
            Ok(Some(body)) => {
                debug!("Snapshot cache hit ({} bytes)", body.len());
                return Ok(Served {
                    body,
                    cache: CacheStatus::Hit,
                });
            }
            Ok(None) => Some(false),
            Err(e) => {
                warn!("Snapshot cache read failed, treating as miss: {}", e);
                None
            }
        };

        info!("Snapshot cache miss, running pipeline");
        self.refresh(exists, CacheStatus::Miss).await
    }

    /// Build and persist a fresh snapshot, overwriting any cached one.
    pub async fn regenerate(&self) -> Result<Served, RosterError> {
        info!("Regenerating snapshot");
        self.refresh(None, CacheStatus::Regenerated).await
    }

    /// `exists` is `None` when the cache state is unknown.
    async fn refresh(&self, exists: Option<bool>, cache: CacheStatus) -> Result<Served, RosterError> {
        let body = Bytes::from(self.source.build().await?);

        let persisted = match exists {
            Some(exists) => {
                storage::write(
                    self.store.as_ref(),
                    &self.bucket,
                    &self.key,
                    body.clone(),
                    SNAPSHOT_CONTENT_TYPE,
                    exists,
                )
                .await
            }
            None => {
                self.store.upsert(&self.bucket, &self.key, body.clone(), SNAPSHOT_CONTENT_TYPE).await
            }
        };

        match persisted {
            Ok(()) => debug!("Persisted snapshot to {}/{}", self.bucket, self.key),
            Err(e) => error!("Serving snapshot that could not be cached: {}", e),
        }

        Ok(Served { body, cache })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryBlobStore, StaticSnapshotSource};

    fn gateway(store: &Arc<MemoryBlobStore>, source: &Arc<StaticSnapshotSource>) -> SnapshotGateway {
        SnapshotGateway::new(store.clone(), source.clone(), "snapshots", "committee.html")
    }

    #[tokio::test]
    async fn test_hit_returns_cached_bytes_without_building() {
        let store = Arc::new(MemoryBlobStore::new());
        store.insert("snapshots", "committee.html", b"<p>cached</p>");
        let source = Arc::new(StaticSnapshotSource::ok("<p>fresh</p>"));

        let served = gateway(&store, &source).serve().await.unwrap();

        assert_eq!(served.cache, CacheStatus::Hit);
        assert_eq!(served.body, Bytes::from_static(b"<p>cached</p>"));
        assert_eq!(source.build_calls(), 0);
        assert_eq!(store.create_calls() + store.replace_calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_builds_and_persists() {
        let store = Arc::new(MemoryBlobStore::new());
        let source = Arc::new(StaticSnapshotSource::ok("<p>fresh</p>"));
        let gateway = gateway(&store, &source);

        let first = gateway.serve().await.unwrap();
        assert_eq!(first.cache, CacheStatus::Miss);
        assert_eq!(first.body, Bytes::from_static(b"<p>fresh</p>"));
        assert_eq!(store.create_calls(), 1);
        assert_eq!(
            store.content_type("snapshots", "committee.html").as_deref(),
            Some(SNAPSHOT_CONTENT_TYPE)
        );

        let second = gateway.serve().await.unwrap();
        assert_eq!(second.cache, CacheStatus::Hit);
        assert_eq!(source.build_calls(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_failure_writes_nothing() {
        let store = Arc::new(MemoryBlobStore::new());
        let source = Arc::new(StaticSnapshotSource::failing(RosterError::NotFound {
            kind: "collection".into(),
            title: "Members".into(),
            parent: "page '2025' (p)".into(),
        }));

        let err = gateway(&store, &source).serve().await.unwrap_err();

        assert!(matches!(err, RosterError::NotFound { .. }));
        assert_eq!(store.create_calls() + store.replace_calls(), 0);
        assert!(store.object("snapshots", "committee.html").is_none());
    }

    #[tokio::test]
    async fn test_persist_failure_still_serves() {
        let store = Arc::new(MemoryBlobStore::new().failing_writes());
        let source = Arc::new(StaticSnapshotSource::ok("<p>fresh</p>"));

        let served = gateway(&store, &source).serve().await.unwrap();
        assert_eq!(served.body, Bytes::from_static(b"<p>fresh</p>"));
    }

    #[tokio::test]
    async fn test_failed_cache_read_is_a_miss() {
        let store = Arc::new(MemoryBlobStore::new().failing_reads());
        let source = Arc::new(StaticSnapshotSource::ok("<p>fresh</p>"));

        let served = gateway(&store, &source).serve().await.unwrap();
        assert_eq!(served.cache, CacheStatus::Miss);
        assert_eq!(source.build_calls(), 1);
    }

    #[tokio::test]
    async fn test_regenerate_overwrites_cached_snapshot() {
        let store = Arc::new(MemoryBlobStore::new());
        store.insert("snapshots", "committee.html", b"old");
        let source = Arc::new(StaticSnapshotSource::ok("new"));

        let served = gateway(&store, &source).regenerate().await.unwrap();

        assert_eq!(served.cache, CacheStatus::Regenerated);
        assert_eq!(store.replace_calls(), 1);
        assert_eq!(store.object("snapshots", "committee.html").unwrap(), Bytes::from_static(b"new"));
    }
}
