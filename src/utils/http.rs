//! Shared HTTP client plumbing for the remote collaborators.

use reqwest::StatusCode;
use std::time::Duration;

use crate::core::RosterError;

/// Build a `reqwest` client with the configured per-request timeout.
///
/// # Errors
///
/// Returns [`RosterError::ConfigError`] if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, RosterError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("rosterd/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RosterError::ConfigError {
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Statuses worth retrying: rate limiting and server-side failures.
#[must_use]
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Transport errors worth retrying: timeouts and failed connections.
#[must_use]
pub fn is_transient_transport(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Trim an error body so it stays readable in logs.
#[must_use]
pub fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 200;
    let body = body.trim();
    if body.len() <= LIMIT {
        return body.to_string();
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
