//! Bounded-attempt backoff policy for transient failures.

use std::time::Duration;

/// Exponential backoff configuration.
///
/// Attempt `n` (1-based) that fails transiently waits
/// `base_delay * multiplier^(n-1)` before the next try, up to
/// `max_attempts` total tries. Permanent failures are never retried.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that fails immediately; useful in tests.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay to wait after the given 1-based attempt fails.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        self.base_delay.mul_f64(factor.max(0.0))
    }
}
