//! Configuration management for rosterd.
//!
//! Configuration is split by sensitivity:
//!
//! - [`Settings`] - non-secret settings from `rosterd.toml` (navigation titles,
//!   record schema, buckets, transport limits, rendering)
//! - [`Credentials`] - tokens and endpoints from the environment or CLI flags
//!
//! [`RosterConfig`] bundles both and is what the pipeline and server are built from.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rosterd::config::{Credentials, RosterConfig, Settings};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::load(Path::new("rosterd.toml")).await?;
//! let credentials = Credentials::from_parts(
//!     std::env::var("NOTION_INTEGRATION_KEY").ok(),
//!     std::env::var("NOTION_DATABASE_ID").ok(),
//!     std::env::var("STORAGE_URL").ok(),
//!     std::env::var("STORAGE_SERVICE_KEY").ok(),
//! )?;
//! let config = RosterConfig::new(settings, credentials);
//! # Ok(())
//! # }
//! ```

mod credentials;
mod settings;

pub use credentials::Credentials;
pub use settings::{
    HttpSettings, MembershipSchema, NavigationSettings, ProfileSchema, RenderSettings,
    SchemaSettings, Settings, StorageSettings, TeamSchema,
};

/// Complete configuration for one rosterd process.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub settings: Settings,
    pub credentials: Credentials,
}

impl RosterConfig {
    #[must_use]
    pub const fn new(settings: Settings, credentials: Credentials) -> Self {
        Self {
            settings,
            credentials,
        }
    }
}
