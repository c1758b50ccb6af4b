//! rosterd - committee roster snapshots from a Notion workspace
//!
//! rosterd walks a fixed page hierarchy in a Notion workspace, joins each
//! committee membership with the people it references, mirrors their profile
//! images into object storage and renders the whole roster as a static HTML
//! snapshot. The snapshot is cached in object storage and served over HTTP.
//!
//! # Architecture Overview
//!
//! A request flows through three layers:
//!
//! - The [`server`] accepts HTTP requests and asks the [`gateway`] for the snapshot
//! - The [`gateway`] returns the cached object or rebuilds it on a miss
//! - The [`roster`] pipeline locates the databases, assembles the roster and
//!   hands the sections to [`render`]
//!
//! # Core Modules
//!
//! ## Content
//! - [`notion`] - Notion API client, record model and cursor pagination
//! - [`resolver`] - Title-based navigation through the page hierarchy
//! - [`roster`] - Record parsing, membership joins, team ordering and the pipeline
//!
//! ## Storage and Media
//! - [`storage`] - Object storage abstraction and its HTTP implementation
//! - [`media`] - Profile image fetching, key derivation and content-hash dedup
//!
//! ## Output
//! - [`render`] - Tera-based HTML rendering of the assembled roster
//! - [`gateway`] - Snapshot cache in front of the pipeline
//! - [`server`] - hyper HTTP front end
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Settings file and credentials
//! - [`constants`] - Defaults shared across modules
//! - [`core`] - Error types and user-facing error formatting
//! - [`utils`] - HTTP client construction and retry
//!
//! # Configuration
//!
//! Secrets come from the environment (or a `.env` file):
//!
//! ```text
//! NOTION_INTEGRATION_KEY=secret_...
//! NOTION_DATABASE_ID=<root collection id>
//! STORAGE_URL=https://project.supabase.co
//! STORAGE_SERVICE_KEY=...
//! ```
//!
//! Everything else lives in `rosterd.toml`, and every field has a default:
//!
//! ```toml
//! [navigation]
//! data_page = "CommitteeData"
//! years_collection = "Committees By Semester"
//! period = "2026 Sem 1"
//!
//! [storage]
//! snapshot_bucket = "snapshots"
//! snapshot_key = "committee.html"
//! media_bucket = "committee"
//! media_prefix = "profiles"
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod gateway;
pub mod media;
pub mod notion;
pub mod render;
pub mod resolver;
pub mod roster;
pub mod server;
pub mod storage;
pub mod utils;

// Test utilities (only compiled in test builds or with the test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
