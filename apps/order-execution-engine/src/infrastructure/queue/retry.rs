//! Retry policy with exponential backoff for execution jobs.
//!
//! `delay = base_delay * 2^(attempts_made - 1)`, so with the defaults a job
//! runs at most 5 times, waiting 1s, 2s, 4s and 8s between attempts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest exponent applied to the base delay.
const MAX_BACKOFF_EXPONENT: u32 = 20;

/// Retry policy configuration for execution jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per job, first run included (default: 5).
    pub max_attempts: u32,
    /// Delay before the first retry (default: 1s).
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom settings.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Returns true if a job that has failed `attempts_made` times may run again.
    #[must_use]
    pub const fn allows_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Backoff before the next run of a job that has failed `attempts_made` times.
    #[must_use]
    pub fn delay_for(&self, attempts_made: u32) -> Duration {
        let exponent = attempts_made.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert!(policy.allows_retry(4));
        assert!(!policy.allows_retry(5));
    }

    #[test_case(1, 1000)]
    #[test_case(2, 2000)]
    #[test_case(3, 4000)]
    #[test_case(4, 8000)]
    fn delay_doubles_per_attempt(attempts_made: u32, expected_ms: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(attempts_made),
            Duration::from_millis(expected_ms)
        );
    }

    #[test]
    fn retry_allowed_until_ceiling() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry(4));
        assert!(!policy.allows_retry(5));
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1));
        assert_eq!(
            policy.delay_for(u32::MAX),
            Duration::from_secs(1 << MAX_BACKOFF_EXPONENT)
        );
    }
}
