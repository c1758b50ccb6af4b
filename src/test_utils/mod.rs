//! Test utilities for rosterd
//!
//! In-memory stand-ins for every external collaborator of the pipeline, so the
//! whole aggregation and caching flow can run without a network:
//!
//! - [`FakeContentSource`] - synthetic collections, pages and child blocks with
//!   call counters, injectable failures and per-page latency
//! - [`RosterFixture`] - a complete workspace along the default navigation path
//! - [`MemoryBlobStore`] - map-backed blob store counting reads and writes
//! - [`FakeMediaFetcher`] - registered image payloads by URL
//! - [`StaticSnapshotSource`] - a snapshot source with a fixed result
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests in `tests/`.

mod content;
mod fixtures;
mod storage;

pub use content::{FakeContentSource, RecordBuilder, block, record};
pub use fixtures::RosterFixture;
pub use storage::{FakeMediaFetcher, MemoryBlobStore, StaticSnapshotSource};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=rosterd=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
