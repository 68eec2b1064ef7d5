//! Per-endpoint failure counting with threshold trip and timed reset.
//!
//! A failure streak starts with the first recorded failure for an endpoint and
//! ends either on the next success or once the reset interval has elapsed
//! since that first failure. The reset deadline is checked lazily on access,
//! so no timers run in the background.

use crate::clock::{Clock, SystemClock};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Failures needed to trip an endpoint.
pub const DEFAULT_THRESHOLD: u32 = 5;

/// How long a failure streak lives after its first failure (5 minutes).
pub const DEFAULT_RESET_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Failure gate consulted by the retry layer.
pub trait Breaker: Send + Sync {
    /// True when calls to `endpoint` should fail fast.
    fn is_tripped(&self, endpoint: &str) -> bool;

    /// Record one failed request outcome. Returns whether the endpoint is now tripped.
    fn record_failure(&self, endpoint: &str) -> bool;

    /// Record a successful request outcome, clearing the streak.
    fn record_success(&self, endpoint: &str);
}

#[derive(Debug, Clone, Copy)]
struct FailureState {
    count: u32,
    /// `None` when the interval reaches past what `Instant` can represent.
    reset_at: Option<Instant>,
}

/// Counting circuit breaker keyed by endpoint id.
#[derive(Debug)]
pub struct ErrorBreaker {
    failures: DashMap<String, FailureState>,
    threshold: u32,
    reset_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for ErrorBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_RESET_INTERVAL)
    }
}

impl ErrorBreaker {
    pub fn new(threshold: u32, reset_interval: Duration) -> Self {
        Self::with_clock(threshold, reset_interval, Arc::new(SystemClock))
    }

    pub fn with_clock(threshold: u32, reset_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { failures: DashMap::new(), threshold: threshold.max(1), reset_interval, clock }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Current failure count for `endpoint` (0 when no streak is active).
    pub fn failure_count(&self, endpoint: &str) -> u32 {
        self.expire(endpoint);
        self.failures.get(endpoint).map(|state| state.count).unwrap_or(0)
    }

    /// Forget any streak for `endpoint`.
    pub fn reset(&self, endpoint: &str) {
        self.failures.remove(endpoint);
    }

    fn expire(&self, endpoint: &str) {
        let now = self.clock.now();
        if self.failures.remove_if(endpoint, |_, state| state.reset_at.is_some_and(|at| now >= at)).is_some() {
            tracing::debug!(endpoint, "failure streak reset after interval");
        }
    }
}

impl Breaker for ErrorBreaker {
    fn is_tripped(&self, endpoint: &str) -> bool {
        self.failure_count(endpoint) >= self.threshold
    }

    fn record_failure(&self, endpoint: &str) -> bool {
        self.expire(endpoint);

        let now = self.clock.now();
        let count = {
            let mut state = self
                .failures
                .entry(endpoint.to_string())
                .or_insert_with(|| FailureState { count: 0, reset_at: now.checked_add(self.reset_interval) });
            state.count = state.count.saturating_add(1);
            state.count
        };

        let tripped = count >= self.threshold;
        if tripped {
            tracing::warn!(endpoint, count, "endpoint tripped after repeated failures");
        } else {
            tracing::debug!(endpoint, count, "recorded endpoint failure");
        }
        tripped
    }

    fn record_success(&self, endpoint: &str) {
        self.failures.remove(endpoint);
    }
}
