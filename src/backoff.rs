use rand::Rng;
use std::time::Duration;

use crate::config::Config;

/// Attempt budget and delays applied around every request.
///
/// Backoff is a fixed wait after a transport failure; jitter is a random
/// wait after every attempt, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub error_wait: Duration,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Config::MAX_ATTEMPTS,
            Duration::from_secs(Config::ERROR_WAIT_SECS),
        )
        .with_jitter(
            Duration::from_secs(Config::WAIT_MIN_SECS),
            Duration::from_secs(Config::WAIT_MAX_SECS),
        )
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, error_wait: Duration) -> Self {
        Self {
            max_attempts,
            error_wait,
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, min: Duration, max: Duration) -> Self {
        self.jitter_min = min;
        self.jitter_max = max.max(min);
        self
    }

    /// A policy that never waits.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Whether a backoff should precede another attempt after `attempt` failed.
    pub fn should_back_off(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    pub fn jitter(&self) -> Duration {
        let min_ms = self.jitter_min.as_millis() as u64;
        let max_ms = self.jitter_max.as_millis() as u64;
        if max_ms <= min_ms {
            return Duration::from_millis(min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }
}
