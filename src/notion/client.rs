//! `reqwest`-backed [`ContentSource`] for the Notion REST API.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{RequestBuilder, header};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::ContentSource;
use super::model::{Block, DatabaseInfo, Record, ResultsPage};
use crate::config::HttpSettings;
use crate::constants::{NOTION_API_BASE, NOTION_API_VERSION, NOTION_PAGE_SIZE};
use crate::core::RosterError;
use crate::utils::http::{build_client, is_transient_status, is_transient_transport, truncate_body};
use crate::utils::{RetryPolicy, with_retry};

/// Notion API client.
///
/// Databases are queried through their first data source. The database to
/// data-source mapping is looked up once per database and memoized for the
/// lifetime of the client.
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    retry: RetryPolicy,
    data_sources: DashMap<String, String>,
}

impl NotionClient {
    /// Create a client authenticated with an integration `token`.
    pub fn new(token: impl Into<String>, settings: &HttpSettings) -> Result<Self, RosterError> {
        Ok(Self {
            http: build_client(settings.timeout())?,
            base_url: NOTION_API_BASE.to_string(),
            token: token.into(),
            retry: RetryPolicy::from_settings(settings),
            data_sources: DashMap::new(),
        })
    }

    /// Point the client at a different API root (for proxies and local stubs).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_API_VERSION)
            .header(header::ACCEPT, "application/json")
    }

    async fn send<T, F>(&self, operation: &str, build: F) -> Result<T, RosterError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let build = &build;
        with_retry(self.retry, operation, move || async move {
            let response = self.authorized(build()).send().await.map_err(|e| {
                RosterError::SourceUnavailable {
                    operation: operation.to_string(),
                    reason: e.to_string(),
                    transient: is_transient_transport(&e),
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RosterError::SourceUnavailable {
                    operation: operation.to_string(),
                    reason: format!("HTTP {status}: {}", truncate_body(&body)),
                    transient: is_transient_status(status),
                });
            }

            response
                .json::<T>()
                .await
                .map_err(|e| RosterError::source(operation, format!("invalid response body: {e}")))
        })
        .await
    }

    /// Resolve a database identifier to the data source that holds its rows.
    async fn data_source_id(&self, database_id: &str) -> Result<String, RosterError> {
        if let Some(id) = self.data_sources.get(database_id) {
            return Ok(id.value().clone());
        }

        let operation = format!("retrieve database {database_id}");
        let url = self.url(&format!("databases/{database_id}"));
        let info: DatabaseInfo = self.send(&operation, || self.http.get(&url)).await?;

        let data_source = info
            .data_sources
            .into_iter()
            .next()
            .ok_or_else(|| RosterError::source(&operation, "database has no data sources"))?;

        debug!("Database {} reads from data source {}", database_id, data_source.id);
        self.data_sources.insert(database_id.to_string(), data_source.id.clone());
        Ok(data_source.id)
    }
}

#[async_trait]
impl ContentSource for NotionClient {
    async fn query_collection(
        &self,
        collection_id: &str,
        cursor: Option<&str>,
    ) -> Result<ResultsPage<Record>, RosterError> {
        let data_source = self.data_source_id(collection_id).await?;
        let url = self.url(&format!("data_sources/{data_source}/query"));
        let mut body = json!({ "page_size": NOTION_PAGE_SIZE });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }

        self.send(&format!("query collection {collection_id}"), || self.http.post(&url).json(&body))
            .await
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ResultsPage<Block>, RosterError> {
        let url = self.url(&format!("blocks/{block_id}/children"));
        let mut query = vec![("page_size", NOTION_PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }

        self.send(&format!("list children of {block_id}"), || self.http.get(&url).query(&query))
            .await
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Record, RosterError> {
        let url = self.url(&format!("pages/{page_id}"));
        self.send(&format!("retrieve page {page_id}"), || self.http.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = NotionClient::new("secret", &HttpSettings::default())
            .unwrap()
            .with_base_url("http://localhost:9999/v1/");
        assert_eq!(client.url("/pages/abc"), "http://localhost:9999/v1/pages/abc");
        assert_eq!(client.url("blocks/x/children"), "http://localhost:9999/v1/blocks/x/children");
    }

    #[test]
    fn test_default_base_url() {
        let client = NotionClient::new("secret", &HttpSettings::default()).unwrap();
        assert_eq!(client.url("pages/abc"), "https://api.notion.com/v1/pages/abc");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_source_unavailable() {
        let settings = HttpSettings {
            timeout_secs: 1,
            retry_attempts: 1,
            ..HttpSettings::default()
        };
        let client = NotionClient::new("secret", &settings)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        let result = client.retrieve_page("abc").await;
        assert!(matches!(result, Err(RosterError::SourceUnavailable { .. })));
    }
}
