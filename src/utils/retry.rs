//! Bounded retry with a fixed (optionally growing) delay between attempts.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Maximum delay between attempts (never below `initial_delay`)
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failure; 1.0 keeps it fixed
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries `max_attempts` times with a fixed delay
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.backoff_multiplier <= 1.0 {
            return self.initial_delay;
        }
        let cap = self.max_delay.max(self.initial_delay);
        let exp = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        Duration::from_secs_f64(exp.min(cap.as_secs_f64()))
    }
}

/// An operation that kept failing until the attempt budget ran out
#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempt(s): {source}")]
pub struct RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Number of attempts made
    pub attempts: u32,
    /// Error returned by the last attempt
    #[source]
    pub source: E,
}

/// Execute an async operation, retrying every failure until the policy's
/// attempt budget is spent
///
/// The operation receives the 1-based attempt number. A warning is logged for
/// each failed attempt that will be retried and an error for the final one.
/// Success returns immediately without any further delay.
///
/// # Arguments
///
/// * `policy` - Retry configuration
/// * `label` - What is being attempted, used in log messages
/// * `operation` - The async operation to execute
pub async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    E: std::error::Error + 'static,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        "{} succeeded on attempt {} after {} failure(s)",
                        label,
                        attempt,
                        attempt - 1
                    );
                }
                return Ok(value);
            }
            Err(error) if attempt >= max_attempts => {
                tracing::error!(
                    attempts = attempt,
                    "{} failed after {} attempt(s): {}",
                    label,
                    attempt,
                    error
                );
                return Err(RetryError {
                    attempts: attempt,
                    source: error,
                });
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    "Attempt {} for {} failed: {}. Retrying in {:?}",
                    attempt,
                    label,
                    error,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}
