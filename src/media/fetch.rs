//! Fetching image bytes from their source URL.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header;

use crate::core::RosterError;
use crate::utils::http::build_client;

/// Bytes of a fetched image and the content type the source reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Downloads media by URL.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RosterError::MediaFetchFailed`] if the source cannot be read.
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, RosterError>;
}

/// [`MediaFetcher`] over plain HTTP GET.
pub struct HttpMediaFetcher {
    http: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new(timeout: std::time::Duration) -> Result<Self, RosterError> {
        Ok(Self {
            http: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, RosterError> {
        let failed = |reason: String| RosterError::MediaFetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self.http.get(url).send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

        Ok(FetchedMedia {
            bytes,
            content_type,
        })
    }
}
