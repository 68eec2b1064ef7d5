//! Bounded exponential-backoff retries gated by an error breaker.
//!
//! The breaker counts request outcomes, not attempts: a request that fails
//! every attempt is recorded as one failure, and a request that eventually
//! succeeds is recorded as one success.

use crate::breaker::Breaker;
use crate::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default number of attempts per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry (doubles on every further retry).
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Attempt budget and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, base_delay: DEFAULT_BASE_DELAY }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Runs fallible operations with retries, consulting a [`Breaker`] first.
#[derive(Clone)]
pub struct RetryingFetcher {
    breaker: Arc<dyn Breaker>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingFetcher").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl RetryingFetcher {
    pub fn new(breaker: Arc<dyn Breaker>, policy: RetryPolicy) -> Self {
        Self { breaker, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute `operation` against `endpoint`.
    ///
    /// # Errors
    ///
    /// - `Error::CircuitOpen` if the endpoint is tripped; `operation` is not run.
    /// - Any non-retryable error from `operation`, unchanged and uncounted.
    /// - `Error::RetriesExhausted` wrapping the last error once every attempt failed.
    pub async fn execute<T, F, Fut>(&self, endpoint: &str, mut operation: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        if self.breaker.is_tripped(endpoint) {
            return Err(Error::CircuitOpen { endpoint: endpoint.to_string() });
        }

        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match operation().await {
                Ok(value) => {
                    self.breaker.record_success(endpoint);
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    tracing::debug!(endpoint, attempt = attempt + 1, error = %err, "upstream attempt failed");
                    last_error = Some(err);
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.policy.delay_for(attempt)).await;
                    }
                }
            }
        }

        let tripped = self.breaker.record_failure(endpoint);
        tracing::warn!(endpoint, attempts, tripped, "upstream request failed after retries");

        Err(Error::RetriesExhausted {
            endpoint: endpoint.to_string(),
            attempts,
            source: Box::new(last_error.unwrap_or(Error::EmptyResponse)),
        })
    }
}
