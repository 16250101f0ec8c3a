//! Retry with exponential back-off and jitter for the places client.
//!
//! [`retry_with_backoff`] wraps one HTTP attempt and retries on transient
//! failures (network errors, 429, 5xx, `OVER_QUERY_LIMIT`, `UNKNOWN_ERROR`).
//! Client errors and definitive API rejections return immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

/// Attempt budget and back-off curve for the request shim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Fractional spread applied to each delay, e.g. `0.2` for ±20 %.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(32),
            jitter_ratio: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt budget and no sleeping between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            jitter_ratio: 0.0,
        }
    }

    /// Un-jittered delay before retry number `retry_index` (0-based):
    /// `min(initial * 2^retry_index, max)`.
    #[must_use]
    pub fn base_delay(&self, retry_index: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(1u32 << retry_index.min(20))
            .min(self.max_backoff)
    }

    /// Base delay scaled by a jitter factor drawn from `unit` in `[0, 1)`.
    ///
    /// `unit = 0.5` gives the base delay exactly. The result never exceeds
    /// `max_backoff`.
    #[must_use]
    pub fn jittered_delay(&self, retry_index: u32, unit: f64) -> Duration {
        let ratio = self.jitter_ratio.clamp(0.0, 0.99);
        let unit = unit.clamp(0.0, 1.0);
        let factor = 1.0 + ratio * (2.0 * unit - 1.0);
        self.base_delay(retry_index)
            .mul_f64(factor)
            .min(self.max_backoff)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection and body errors, HTTP 429, HTTP 5xx,
/// and the `OVER_QUERY_LIMIT` / `UNKNOWN_ERROR` statuses.
///
/// **Not retriable:** HTTP 4xx other than 429, `INVALID_REQUEST`,
/// `REQUEST_DENIED`, malformed bodies, bad base URLs.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.is_request()
                || e.is_body()
                || e.status().is_some_and(|s| s.is_server_error())
        }
        PlacesError::RateLimited { .. }
        | PlacesError::ServerError { .. }
        | PlacesError::Transient { .. } => true,
        PlacesError::ClientError { .. }
        | PlacesError::Deserialize { .. }
        | PlacesError::Rejected { .. }
        | PlacesError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` up to `policy.max_attempts` times while it fails with a
/// retriable error, sleeping `policy.jittered_delay(n, _)` before retry `n`.
///
/// Non-retriable errors and the error from the final attempt are returned
/// as-is.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    endpoint: &str,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(endpoint, attempt = attempt + 1, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !is_retriable(&err) || attempt + 1 >= max_attempts {
                    return Err(err);
                }
                let delay = policy.jittered_delay(attempt, rand::random::<f64>());
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    endpoint,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "transient places API error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
