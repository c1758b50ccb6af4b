//! Durable blob store for media assets and the cached snapshot.
//!
//! The pipeline only needs keyed reads, creates and replaces inside a bucket,
//! plus a way to turn a key into a public URL. [`BlobStore`] captures exactly
//! that; [`StorageClient`] implements it against a Supabase-style storage API.
//!
//! The store is treated as externally consistent: last writer wins and no
//! conditional writes are attempted.

mod client;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

pub use client::StorageClient;

use crate::core::RosterError;

/// Keyed object storage grouped into buckets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read an object. `Ok(None)` means the key does not exist.
    async fn get(&self, bucket: &str, path: &str) -> Result<Option<Bytes>, RosterError>;

    /// Store a new object at a key that is expected to be free.
    async fn create(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError>;

    /// Overwrite an existing object.
    async fn replace(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError>;

    /// Public URL of an object. Does not check that the object exists.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Create the object, or replace it if something is already stored at `path`.
    ///
    /// A failed existence check counts as absent.
    async fn upsert(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError> {
        let exists = match self.get(bucket, path).await {
            Ok(existing) => existing.is_some(),
            Err(e) => {
                warn!("Could not check {}/{} before writing: {}", bucket, path, e);
                false
            }
        };
        write(self, bucket, path, body, content_type, exists).await
    }
}

/// Write with create or replace semantics, depending on whether the key is known to exist.
pub async fn write<S: BlobStore + ?Sized>(
    store: &S,
    bucket: &str,
    path: &str,
    body: Bytes,
    content_type: &str,
    exists: bool,
) -> Result<(), RosterError> {
    if exists {
        store.replace(bucket, path, body, content_type).await
    } else {
        store.create(bucket, path, body, content_type).await
    }
}

/// Bucket-qualified key used in error messages and logs.
pub(crate) fn qualified_key(bucket: &str, path: &str) -> String {
    format!("{bucket}/{path}")
}
