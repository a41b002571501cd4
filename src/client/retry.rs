//! Retry schedule for cached reads.

use std::time::Duration;

/// Capped exponential backoff applied to failed reads.
///
/// The delay before retry `n` (zero-based) is `min(base_delay * 2^n, max_delay)`.
/// Mutations are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three retries: 1s, 2s, 4s (capped at 30s).
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    /// A policy that surfaces the first failure.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delays to wait before each retry, in order.
    ///
    /// Fed directly to [`tokio_retry::Retry`] as its strategy.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + Send + use<> {
        let policy = *self;
        (0..policy.max_retries).map(move |attempt| policy.delay_for(attempt))
    }
}
