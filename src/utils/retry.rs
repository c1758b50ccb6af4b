//! Bounded retry for transport calls.
//!
//! Remote calls (content source, blob store) go through [`with_retry`], which
//! retries only failures that [`RosterError::is_transient`] marks as worth
//! retrying: timeouts, connection errors, HTTP 429 and 5xx. Everything else
//! fails on the first attempt.

use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::HttpSettings;
use crate::constants::MAX_RETRY_DELAY;
use crate::core::RosterError;

/// Retry schedule for one kind of transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub attempts: usize,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(attempts: usize, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    #[must_use]
    pub fn from_settings(http: &HttpSettings) -> Self {
        Self::new(http.retry_attempts, Duration::from_millis(http.retry_base_delay_ms))
    }

    /// Jittered delays between attempts: base, 2×base, 4×base … capped at
    /// [`MAX_RETRY_DELAY`].
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        // ExponentialBackoff yields `base^n * factor`; base 2 with factor half the
        // configured delay gives a doubling schedule starting at that delay.
        let half = (self.base_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(half)
            .max_delay(MAX_RETRY_DELAY)
            .map(jitter)
            .take(self.attempts.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&HttpSettings::default())
    }
}

/// Run `action` under `policy`, retrying transient [`RosterError`]s.
///
/// `operation` names the call in debug logs.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut action: F,
) -> Result<T, RosterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RosterError>>,
{
    let mut attempt = 0usize;
    RetryIf::spawn(
        policy.delays(),
        || {
            attempt += 1;
            if attempt > 1 {
                tracing::debug!("Retrying {} (attempt {}/{})", operation, attempt, policy.attempts);
            }
            action()
        },
        |error: &RosterError| error.is_transient(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn transient() -> RosterError {
        RosterError::SourceUnavailable {
            operation: "query".into(),
            reason: "HTTP 503".into(),
            transient: true,
        }
    }

    fn fast(attempts: usize) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(2))
    }

    #[test]
    fn test_delay_count_matches_attempts() {
        assert_eq!(fast(4).delays().count(), 3);
        assert_eq!(RetryPolicy::none().delays().count(), 0);
    }

    #[test]
    fn test_delays_are_capped() {
        let policy = RetryPolicy::new(20, Duration::from_secs(2));
        assert!(policy.delays().all(|d| d <= MAX_RETRY_DELAY));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = with_retry(fast(3), "query", || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 { Err(transient()) } else { Ok(7) }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = with_retry(fast(5), "query", || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RosterError::source("query", "HTTP 400"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = with_retry(fast(3), "query", || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert_eq!(result, Err(transient()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
