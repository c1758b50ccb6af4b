//! In-memory collaborators for the storage, media and snapshot seams.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::RosterError;
use crate::gateway::SnapshotSource;
use crate::media::{FetchedMedia, MediaFetcher};
use crate::storage::BlobStore;

type ObjectKey = (String, String);

/// A [`BlobStore`] holding objects in a map.
///
/// `create` refuses existing keys and `replace` refuses missing ones, like the
/// real storage service. Public URLs use the `memory://{bucket}/{path}` form.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<ObjectKey, (Bytes, String)>>,
    reads: AtomicUsize,
    creates: AtomicUsize,
    replaces: AtomicUsize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `get` fails with a non-transient read error.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Every `create` and `replace` fails with a non-transient write error.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Seed an object without counting a write.
    pub fn insert(&self, bucket: &str, path: &str, body: &[u8]) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), path.to_string()),
            (Bytes::copy_from_slice(body), "application/octet-stream".to_string()),
        );
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.entry(bucket, path).map(|(body, _)| body)
    }

    pub fn content_type(&self, bucket: &str, path: &str) -> Option<String> {
        self.entry(bucket, path).map(|(_, content_type)| content_type)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn replace_calls(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    fn entry(&self, bucket: &str, path: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(&(bucket.to_string(), path.to_string())).cloned()
    }

    fn store(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
        must_exist: bool,
    ) -> Result<(), RosterError> {
        let key = format!("{bucket}/{path}");
        let write_failed = |reason: &str| RosterError::StorageWriteFailed {
            key: key.clone(),
            reason: reason.to_string(),
            transient: false,
        };

        if self.fail_writes {
            return Err(write_failed("HTTP 503: injected"));
        }
        let mut objects = self.objects.lock().unwrap();
        let slot = (bucket.to_string(), path.to_string());
        match (objects.contains_key(&slot), must_exist) {
            (true, false) => Err(write_failed("HTTP 409: The resource already exists")),
            (false, true) => Err(write_failed("HTTP 404: Object not found")),
            _ => {
                objects.insert(slot, (body, content_type.to_string()));
                Ok(())
            }
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, bucket: &str, path: &str) -> Result<Option<Bytes>, RosterError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(RosterError::StorageReadFailed {
                key: format!("{bucket}/{path}"),
                reason: "HTTP 503: injected".to_string(),
                transient: false,
            });
        }
        Ok(self.object(bucket, path))
    }

    async fn create(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.store(bucket, path, body, content_type, false)
    }

    async fn replace(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        self.store(bucket, path, body, content_type, true)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

/// A [`MediaFetcher`] serving registered byte payloads.
///
/// Unregistered URLs fail with [`RosterError::MediaFetchFailed`].
#[derive(Default)]
pub struct FakeMediaFetcher {
    images: Mutex<HashMap<String, FetchedMedia>>,
    calls: AtomicUsize,
}

impl FakeMediaFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, url: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
        self.set_image(url, bytes, content_type);
        self
    }

    /// Register or change the payload served at `url`.
    pub fn set_image(&self, url: &str, bytes: &[u8], content_type: Option<&str>) {
        self.images.lock().unwrap().insert(
            url.to_string(),
            FetchedMedia {
                bytes: Bytes::copy_from_slice(bytes),
                content_type: content_type.map(str::to_string),
            },
        );
    }

    pub fn fetch_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for FakeMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, RosterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images.lock().unwrap().get(url).cloned().ok_or_else(|| {
            RosterError::MediaFetchFailed {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            }
        })
    }
}

/// A [`SnapshotSource`] returning a fixed result and counting builds.
pub struct StaticSnapshotSource {
    result: Result<String, RosterError>,
    calls: AtomicUsize,
}

impl StaticSnapshotSource {
    pub fn ok(html: &str) -> Self {
        Self {
            result: Ok(html.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: RosterError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn build_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshotSource {
    async fn build(&self) -> Result<String, RosterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
