//! Bounded retry with exponential backoff and jitter.
//!
//! Shared by the search client and the fallback model. Each attempt
//! classifies its own outcome; this module only decides whether and how
//! long to wait before the next one.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;
use crate::error::SearchError;

/// How a single attempt ended.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The attempt succeeded.
    Success(T),
    /// The attempt failed transiently. `retry_after` is a server-provided
    /// lower bound on the wait.
    Retryable {
        error: SearchError,
        retry_after: Option<Duration>,
    },
    /// The attempt failed permanently; stop immediately.
    Fatal(SearchError),
}

impl<T> AttemptOutcome<T> {
    /// A retryable failure with no server hint.
    pub fn retry(error: SearchError) -> Self {
        Self::Retryable {
            error,
            retry_after: None,
        }
    }
}

/// Delay before the attempt following failed attempt number `attempt` (1-based).
///
/// The ceiling doubles per attempt from `base_backoff_ms` and is capped at
/// `max_backoff_ms`. The returned delay is uniformly drawn from the upper
/// half of the ceiling so that concurrent callers spread out but never
/// retry immediately. A `retry_after` hint raises the delay, still capped.
pub fn backoff_delay(config: &RetryConfig, attempt: u32, retry_after: Option<Duration>) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let ceiling_ms = config
        .base_backoff_ms
        .saturating_mul(1u64 << exponent)
        .min(config.max_backoff_ms);

    let half = ceiling_ms / 2;
    let jittered_ms = if ceiling_ms == 0 {
        0
    } else {
        half + rand::thread_rng().gen_range(0..=ceiling_ms - half)
    };

    let floor_ms = retry_after
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0);

    Duration::from_millis(jittered_ms.max(floor_ms).min(config.max_backoff_ms))
}

/// Run `attempt` up to `config.max_attempts` times.
///
/// The closure receives the 1-based attempt number. On exhaustion the last
/// retryable error is returned with the attempt count appended.
///
/// # Errors
///
/// Returns the fatal error of the first [`AttemptOutcome::Fatal`] attempt, or
/// the last retryable error once attempts are exhausted.
pub async fn run_with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut attempt: F,
) -> Result<T, SearchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut last_error = None;

    for n in 1..=max_attempts {
        match attempt(n).await {
            AttemptOutcome::Success(value) => {
                if n > 1 {
                    tracing::debug!(operation, attempt = n, "succeeded after retry");
                }
                return Ok(value);
            }
            AttemptOutcome::Fatal(error) => return Err(error),
            AttemptOutcome::Retryable { error, retry_after } => {
                if n < max_attempts {
                    let delay = backoff_delay(config, n, retry_after);
                    tracing::warn!(
                        operation,
                        attempt = n,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(error);
            }
        }
    }

    Err(match last_error {
        Some(error) => exhausted(error, max_attempts),
        None => SearchError::Config(format!("{operation}: no attempts were made")),
    })
}

/// Append the attempt count to an error's message, keeping its variant.
fn exhausted(error: SearchError, attempts: u32) -> SearchError {
    let suffix = format!(" (gave up after {attempts} attempts)");
    match error {
        SearchError::RateLimited(m) => SearchError::RateLimited(m + &suffix),
        SearchError::Provider(m) => SearchError::Provider(m + &suffix),
        SearchError::Model(m) => SearchError::Model(m + &suffix),
        other => other,
    }
}
