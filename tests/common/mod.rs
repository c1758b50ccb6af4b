//! Common test utilities for rosterd integration tests
//!
//! Wires the real pipeline, media synchronizer, renderer and gateway to the
//! in-memory collaborators from `rosterd::test_utils`, keeping handles on the
//! fakes so tests can inspect call counts and stored objects.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use std::process::Command;
use std::sync::Arc;

use assert_cmd::cargo::CommandCargoExt;
use rosterd::config::Settings;
use rosterd::gateway::SnapshotGateway;
use rosterd::media::MediaSynchronizer;
use rosterd::render::{DEFAULT_TEMPLATE, SnapshotRenderer};
use rosterd::roster::RosterPipeline;
use rosterd::test_utils::{FakeContentSource, FakeMediaFetcher, MemoryBlobStore, RosterFixture};

/// Bucket and key of the cached snapshot under default settings.
pub const SNAPSHOT_BUCKET: &str = "snapshots";
pub const SNAPSHOT_KEY: &str = "committee.html";
/// Bucket receiving profile images under default settings.
pub const MEDIA_BUCKET: &str = "committee";

/// A fully wired roster service over in-memory collaborators.
pub struct Harness {
    pub source: Arc<FakeContentSource>,
    pub store: Arc<MemoryBlobStore>,
    pub fetcher: Arc<FakeMediaFetcher>,
    pub pipeline: Arc<RosterPipeline>,
    pub gateway: Arc<SnapshotGateway>,
}

impl Harness {
    pub fn new(source: FakeContentSource) -> Self {
        Self::with_parts(source, MemoryBlobStore::new(), FakeMediaFetcher::new())
    }

    pub fn with_fetcher(source: FakeContentSource, fetcher: FakeMediaFetcher) -> Self {
        Self::with_parts(source, MemoryBlobStore::new(), fetcher)
    }

    pub fn with_parts(
        source: FakeContentSource,
        store: MemoryBlobStore,
        fetcher: FakeMediaFetcher,
    ) -> Self {
        let settings = Settings::default();
        let source = Arc::new(source);
        let store = Arc::new(store);
        let fetcher = Arc::new(fetcher);

        let media = MediaSynchronizer::new(
            store.clone(),
            fetcher.clone(),
            &settings.storage.media_bucket,
            &settings.storage.media_prefix,
        );
        let renderer = SnapshotRenderer::new(DEFAULT_TEMPLATE, false).unwrap();
        let pipeline = Arc::new(RosterPipeline::new(
            source.clone(),
            media,
            renderer,
            RosterFixture::ROOT_ID,
            &settings,
        ));
        let gateway = Arc::new(SnapshotGateway::new(
            store.clone(),
            pipeline.clone(),
            &settings.storage.snapshot_bucket,
            &settings.storage.snapshot_key,
        ));

        Self {
            source,
            store,
            fetcher,
            pipeline,
            gateway,
        }
    }

    /// The cached snapshot as text, if one is stored.
    pub fn cached_snapshot(&self) -> Option<String> {
        self.store
            .object(SNAPSHOT_BUCKET, SNAPSHOT_KEY)
            .map(|body| String::from_utf8_lossy(&body).into_owned())
    }
}

/// The `rosterd` binary with a clean environment rooted in `dir`.
///
/// Clearing the environment keeps the developer's credentials and any `.env`
/// file out of the test.
pub fn rosterd_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("rosterd").unwrap();
    cmd.env_clear().current_dir(dir).env("NO_COLOR", "1");
    cmd
}
