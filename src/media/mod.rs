//! Profile image synchronization.
//!
//! Images hosted outside the content source are linked as-is. Images uploaded
//! to the content source sit behind short-lived URLs, so [`MediaSynchronizer`]
//! copies them into the blob store under a key derived from the person's name
//! and links the stored copy instead.
//!
//! # Sync Algorithm
//!
//! 1. Fetch the source bytes (failure is [`RosterError::MediaFetchFailed`])
//! 2. Derive the key `{prefix}/{normalized name}.{ext}` and the content digest
//! 3. Read back whatever is stored at the key and digest it too
//! 4. Equal digests: nothing to do. Otherwise create or replace the object
//! 5. Return the public URL of the key
//!
//! Repeated runs with unchanged source bytes therefore upload once, and a
//! changed image is replaced on the next run.

mod fetch;
mod key;

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

pub use fetch::{FetchedMedia, HttpMediaFetcher, MediaFetcher};
pub use key::{content_digest, effective_content_type, extension_for, normalize_name, storage_key};

use crate::core::RosterError;
use crate::roster::{ImageReference, ProfileRecord};
use crate::storage::{self, BlobStore};

/// An image on its way into the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub content_hash: String,
    pub bytes: Bytes,
    pub content_type: String,
    pub target_path: String,
}

/// Copies uploaded profile images into the blob store.
#[derive(Clone)]
pub struct MediaSynchronizer {
    store: Arc<dyn BlobStore>,
    fetcher: Arc<dyn MediaFetcher>,
    bucket: String,
    prefix: String,
}

impl MediaSynchronizer {
    pub fn new(
        store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn MediaFetcher>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            fetcher,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Publicly resolvable URL for a profile's image.
    ///
    /// # Errors
    ///
    /// Only [`RosterError::MediaFetchFailed`]. Storage failures are logged and
    /// the computed URL is returned anyway.
    pub async fn resolve_image(&self, profile: &ProfileRecord) -> Result<String, RosterError> {
        let (source_url, hint) = match &profile.image {
            ImageReference::External { url } => return Ok(url.clone()),
            ImageReference::Uploaded {
                source_url,
                content_type_hint,
            } => (source_url, content_type_hint.as_deref()),
        };

        let fetched = self.fetcher.fetch(source_url).await?;
        let asset = self.prepare(profile, fetched, hint);
        let url = self.store.public_url(&self.bucket, &asset.target_path);

        let existing = match self.store.get(&self.bucket, &asset.target_path).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Could not read back {}: {}", asset.target_path, e);
                None
            }
        };

        if let Some(stored) = &existing {
            if content_digest(stored) == asset.content_hash {
                debug!("Image for {} unchanged ({})", profile.display_name, asset.content_hash);
                return Ok(url);
            }
        }

        let write = storage::write(
            self.store.as_ref(),
            &self.bucket,
            &asset.target_path,
            asset.bytes,
            &asset.content_type,
            existing.is_some(),
        )
        .await;

        match write {
            Ok(()) => debug!("Uploaded image for {} to {}", profile.display_name, asset.target_path),
            Err(e) => warn!("Image upload for {} failed, linking anyway: {}", profile.display_name, e),
        }
        Ok(url)
    }

    fn prepare(&self, profile: &ProfileRecord, fetched: FetchedMedia, hint: Option<&str>) -> MediaAsset {
        let content_type = effective_content_type(fetched.content_type.as_deref(), hint);
        MediaAsset {
            content_hash: content_digest(&fetched.bytes),
            target_path: storage_key(&self.prefix, &profile.display_name, &profile.id, &content_type),
            bytes: fetched.bytes,
            content_type,
        }
    }
}
