//! Secrets and endpoints supplied through the environment.
//!
//! Credentials never live in `rosterd.toml`. They come from CLI flags or their
//! environment variables (see [`crate::cli`]), optionally seeded from a `.env`
//! file by `dotenvy` at startup.

use std::fmt;

use crate::core::RosterError;

/// Connection details for the content source and the blob store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Notion integration token (`NOTION_INTEGRATION_KEY`).
    pub notion_token: String,
    /// Identifier of the root collection (`NOTION_DATABASE_ID`).
    pub root_collection_id: String,
    /// Blob-store base URL (`STORAGE_URL`), e.g. `https://xyz.supabase.co`.
    pub storage_url: String,
    /// Blob-store service key (`STORAGE_SERVICE_KEY`).
    pub storage_key: String,
}

impl Credentials {
    /// Build credentials from optional values, naming the first one that is missing.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::ConfigError`] if any value is absent or blank.
    pub fn from_parts(
        notion_token: Option<String>,
        root_collection_id: Option<String>,
        storage_url: Option<String>,
        storage_key: Option<String>,
    ) -> Result<Self, RosterError> {
        fn required(value: Option<String>, name: &str) -> Result<String, RosterError> {
            value.filter(|v| !v.trim().is_empty()).ok_or_else(|| RosterError::ConfigError {
                message: format!("{name} is not set"),
            })
        }

        Ok(Self {
            notion_token: required(notion_token, "NOTION_INTEGRATION_KEY")?,
            root_collection_id: required(root_collection_id, "NOTION_DATABASE_ID")?,
            storage_url: required(storage_url, "STORAGE_URL")?
                .trim_end_matches('/')
                .to_string(),
            storage_key: required(storage_key, "STORAGE_SERVICE_KEY")?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("notion_token", &"<redacted>")
            .field("root_collection_id", &self.root_collection_id)
            .field("storage_url", &self.storage_url)
            .field("storage_key", &"<redacted>")
            .finish()
    }
}
