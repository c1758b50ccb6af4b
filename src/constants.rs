//! Global constants used throughout the rosterd codebase.
//!
//! Remote API parameters, retry bounds and other numeric constants that are
//! shared across modules live here so magic numbers stay discoverable.

use std::time::Duration;

/// Notion REST API base URL.
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Notion API version sent with every request.
///
/// This version exposes databases as containers of data sources, which is why
/// collection queries go through `/data_sources/{id}/query`.
pub const NOTION_API_VERSION: &str = "2025-09-03";

/// Page size requested from paginated Notion endpoints (the API maximum).
pub const NOTION_PAGE_SIZE: u32 = 100;

/// Default per-request timeout for remote calls (30 seconds).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on concurrent per-member profile and image work.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default number of attempts for a transient transport failure.
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;

/// Starting delay for exponential backoff between retries (100ms).
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;

/// Maximum backoff delay between retries (5 seconds).
///
/// Exponential backoff delays are capped at this value so a flapping upstream
/// cannot stall a request indefinitely.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Content type used for images whose source reports none.
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// File extension paired with [`DEFAULT_IMAGE_CONTENT_TYPE`].
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpeg";

/// Content type of the rendered snapshot.
pub const SNAPSHOT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Default listen address for `rosterd serve`.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rosterd.toml";
