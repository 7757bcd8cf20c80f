//! Reconnect Backoff
//!
//! Exponential delay with a ceiling and a bounded number of attempts.

use std::time::Duration;

/// Default maximum reconnect attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default base delay; attempt `k` waits `base * 2^k`.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Default ceiling on a single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(16_000);

/// Tracks reconnect attempts and computes the delay before each one.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            attempts: 0,
        }
    }

    /// Delay before attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Count one more attempt and return its delay, or `None` once the
    /// limit is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.delay_for(self.attempts))
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}
