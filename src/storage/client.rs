//! `reqwest`-backed [`BlobStore`] for a Supabase-style storage REST API.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{RequestBuilder, Response, StatusCode, header};
use tracing::debug;

use super::{BlobStore, qualified_key};
use crate::config::HttpSettings;
use crate::core::RosterError;
use crate::utils::http::{build_client, is_transient_status, is_transient_transport, truncate_body};
use crate::utils::{RetryPolicy, with_retry};

/// Storage API client authenticated with a service key.
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    retry: RetryPolicy,
}

impl StorageClient {
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        settings: &HttpSettings,
    ) -> Result<Self, RosterError> {
        Ok(Self {
            http: build_client(settings.timeout())?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            retry: RetryPolicy::from_settings(settings),
        })
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.service_key).header("apikey", &self.service_key)
    }

    async fn upload(
        &self,
        method: reqwest::Method,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError> {
        let key = qualified_key(bucket, path);
        let url = self.object_url(bucket, path);
        let operation = format!("{method} {key}");

        with_retry(self.retry, &operation, || {
            let request = self
                .authorized(self.http.request(method.clone(), &url))
                .header(header::CONTENT_TYPE, content_type)
                .header("x-upsert", "false")
                .body(body.clone());
            let key = key.clone();
            async move {
                let response = request.send().await.map_err(|e| RosterError::StorageWriteFailed {
                    key: key.clone(),
                    reason: e.to_string(),
                    transient: is_transient_transport(&e),
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(RosterError::StorageWriteFailed {
                        key,
                        reason: failure_reason(status, response).await,
                        transient: is_transient_status(status),
                    });
                }
                Ok(())
            }
        })
        .await?;

        debug!("Stored {}", key);
        Ok(())
    }
}

async fn failure_reason(status: StatusCode, response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    format!("HTTP {status}: {}", truncate_body(&body))
}

/// The storage service reports some missing objects as 400 with a "not found" body.
fn is_missing(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND
        || (status == StatusCode::BAD_REQUEST && body.to_lowercase().contains("not found"))
}

#[async_trait]
impl BlobStore for StorageClient {
    async fn get(&self, bucket: &str, path: &str) -> Result<Option<Bytes>, RosterError> {
        let key = qualified_key(bucket, path);
        let url = self.object_url(bucket, path);

        with_retry(self.retry, &format!("GET {key}"), || {
            let request = self.authorized(self.http.get(&url));
            let key = key.clone();
            async move {
                let response = request.send().await.map_err(|e| RosterError::StorageReadFailed {
                    key: key.clone(),
                    reason: e.to_string(),
                    transient: is_transient_transport(&e),
                })?;

                let status = response.status();
                if status.is_success() {
                    let bytes = response.bytes().await.map_err(|e| {
                        RosterError::StorageReadFailed {
                            key: key.clone(),
                            reason: e.to_string(),
                            transient: is_transient_transport(&e),
                        }
                    })?;
                    return Ok(Some(bytes));
                }

                let body = response.text().await.unwrap_or_default();
                if is_missing(status, &body) {
                    return Ok(None);
                }
                Err(RosterError::StorageReadFailed {
                    key,
                    reason: format!("HTTP {status}: {}", truncate_body(&body)),
                    transient: is_transient_status(status),
                })
            }
        })
        .await
    }

    async fn create(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError> {
        self.upload(reqwest::Method::POST, bucket, path, body, content_type).await
    }

    async fn replace(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), RosterError> {
        self.upload(reqwest::Method::PUT, bucket, path, body, content_type).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StorageClient {
        StorageClient::new("https://store.example.co/", "service-key", &HttpSettings::default())
            .unwrap()
    }

    #[test]
    fn test_object_and_public_urls() {
        let client = client();
        assert_eq!(
            client.object_url("committee", "profiles/AdaLovelace.png"),
            "https://store.example.co/storage/v1/object/committee/profiles/AdaLovelace.png"
        );
        assert_eq!(
            client.public_url("committee", "/profiles/AdaLovelace.png"),
            "https://store.example.co/storage/v1/object/public/committee/profiles/AdaLovelace.png"
        );
    }

    #[test]
    fn test_missing_object_detection() {
        assert!(is_missing(StatusCode::NOT_FOUND, ""));
        assert!(is_missing(
            StatusCode::BAD_REQUEST,
            r#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#
        ));
        assert!(!is_missing(StatusCode::BAD_REQUEST, r#"{"message":"Invalid key"}"#));
        assert!(!is_missing(StatusCode::INTERNAL_SERVER_ERROR, "not found"));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_read_failure() {
        let settings = HttpSettings {
            timeout_secs: 1,
            retry_attempts: 1,
            ..HttpSettings::default()
        };
        let client = StorageClient::new("http://127.0.0.1:9", "key", &settings).unwrap();

        let err = client.get("b", "k").await.unwrap_err();
        assert!(matches!(err, RosterError::StorageReadFailed { .. }));

        let err = client.create("b", "k", Bytes::from_static(b"x"), "text/plain").await.unwrap_err();
        assert!(matches!(err, RosterError::StorageWriteFailed { .. }));
    }
}
