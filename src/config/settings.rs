//! File-based settings for rosterd.
//!
//! Everything that is not a secret lives in `rosterd.toml`: the titles used to
//! navigate the workspace, the property names read from each record kind, the
//! buckets used for media and the snapshot, transport limits and rendering
//! options. Every field has a default, so an empty or missing file is valid.
//!
//! # File Format
//!
//! ```toml
//! [navigation]
//! data_page = "CommitteeData"
//! years_collection = "Committees By Semester"
//! period = "2026 Sem 1"
//! members_collection = "_team"
//! teams_collection = "_rolemetadata"
//!
//! [schema.membership]
//! title = "Name"
//! team = "team"
//! role_tier = "role"
//! members = "Committee Members"
//!
//! [schema.team]
//! team_name = "Name"
//! sort_index = "index"
//!
//! [schema.profile]
//! display_name = "Name"
//! image = "Portrait"
//!
//! [storage]
//! media_bucket = "committee"
//! media_prefix = "profiles"
//! snapshot_bucket = "snapshots"
//! snapshot_key = "committee.html"
//!
//! [http]
//! timeout_secs = 30
//! max_concurrency = 8
//! retry_attempts = 3
//! retry_base_delay_ms = 100
//!
//! [render]
//! escape_text = false
//! ```

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_MAX_CONCURRENCY, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_BASE_DELAY_MS,
};

/// Top-level settings loaded from `rosterd.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Titles of the nodes walked from the root collection to the roster data.
    pub navigation: NavigationSettings,
    /// Property names read from each record kind.
    pub schema: SchemaSettings,
    /// Buckets and keys in the blob store.
    pub storage: StorageSettings,
    /// Transport limits shared by every remote collaborator.
    pub http: HttpSettings,
    /// Snapshot rendering options.
    pub render: RenderSettings,
}

/// The fixed navigation path to the roster collections.
///
/// Root collection → page `data_page` → collection `years_collection` →
/// page `period` → collections `members_collection` and `teams_collection`.
/// All titles match exactly and case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationSettings {
    pub data_page: String,
    pub years_collection: String,
    /// The period (semester) served; a fixed selector, not a request parameter.
    pub period: String,
    pub members_collection: String,
    pub teams_collection: String,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            data_page: "CommitteeData".to_string(),
            years_collection: "Committees By Semester".to_string(),
            period: "2026 Sem 1".to_string(),
            members_collection: "_team".to_string(),
            teams_collection: "_rolemetadata".to_string(),
        }
    }
}

/// Property names for the three record kinds the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaSettings {
    pub membership: MembershipSchema,
    pub team: TeamSchema,
    pub profile: ProfileSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MembershipSchema {
    /// Title property holding the role/position label.
    pub title: String,
    /// Select property holding the team label.
    pub team: String,
    /// Select property holding the role tier ("director"/"officer").
    pub role_tier: String,
    /// Relation property referencing profile records.
    pub members: String,
}

impl Default for MembershipSchema {
    fn default() -> Self {
        Self {
            title: "Name".to_string(),
            team: "team".to_string(),
            role_tier: "role".to_string(),
            members: "Committee Members".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamSchema {
    /// Title property holding the team name.
    pub team_name: String,
    /// Number property holding the display order.
    pub sort_index: String,
}

impl Default for TeamSchema {
    fn default() -> Self {
        Self {
            team_name: "Name".to_string(),
            sort_index: "index".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileSchema {
    /// Title property holding the person's display name.
    pub display_name: String,
    /// Files property holding the profile image.
    pub image: String,
}

impl Default for ProfileSchema {
    fn default() -> Self {
        Self {
            display_name: "Name".to_string(),
            image: "Portrait".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    /// Bucket receiving synchronized profile images.
    pub media_bucket: String,
    /// Path prefix for profile images inside `media_bucket`.
    pub media_prefix: String,
    /// Bucket holding the cached snapshot.
    pub snapshot_bucket: String,
    /// Key of the cached snapshot inside `snapshot_bucket`.
    pub snapshot_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            media_bucket: "committee".to_string(),
            media_prefix: "profiles".to_string(),
            snapshot_bucket: "snapshots".to_string(),
            snapshot_key: "committee.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bound on concurrent per-member profile and image work.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Attempts per transport call, including the first.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT.as_secs()
}

const fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

const fn default_retry_attempts() -> usize {
    DEFAULT_RETRY_ATTEMPTS
}

const fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Tera template replacing the built-in snapshot layout.
    pub template: Option<PathBuf>,
    /// HTML-escape names and titles. Off by default: source text is emitted verbatim.
    pub escape_text: bool,
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, is not valid TOML,
    /// contains unknown keys, or fails [`Settings::validate`].
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings = Self::parse(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        Ok(settings)
    }

    /// Parse and validate settings from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.http.max_concurrency > 0, "http.max_concurrency must be at least 1");
        ensure!(self.http.retry_attempts > 0, "http.retry_attempts must be at least 1");
        ensure!(self.http.timeout_secs > 0, "http.timeout_secs must be at least 1");

        let nav = &self.navigation;
        for (field, value) in [
            ("navigation.data_page", &nav.data_page),
            ("navigation.years_collection", &nav.years_collection),
            ("navigation.period", &nav.period),
            ("navigation.members_collection", &nav.members_collection),
            ("navigation.teams_collection", &nav.teams_collection),
            ("storage.media_bucket", &self.storage.media_bucket),
            ("storage.snapshot_bucket", &self.storage.snapshot_bucket),
            ("storage.snapshot_key", &self.storage.snapshot_key),
        ] {
            ensure!(!value.trim().is_empty(), "{field} must not be empty");
        }
        Ok(())
    }
}
