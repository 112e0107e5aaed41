//! Execution queue and worker pool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::queue::RetryPolicy;

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of workers and maximum simultaneously active jobs.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Maximum job starts per rate-limit window (0 disables limiting).
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: usize,
    /// Rate-limit window in milliseconds.
    #[serde(default = "default_rate_limit_duration_ms")]
    pub rate_limit_duration_ms: u64,
    /// Attempts per job, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay of the exponential backoff in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_duration_ms: default_rate_limit_duration_ms(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl QueueConfig {
    /// Rate-limit window.
    #[must_use]
    pub const fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_duration_ms)
    }

    /// Retry policy for failed jobs.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.backoff_base_ms),
        )
    }
}

pub(crate) const fn default_concurrency() -> usize {
    10
}

pub(crate) const fn default_rate_limit_max() -> usize {
    100
}

pub(crate) const fn default_rate_limit_duration_ms() -> u64 {
    60_000
}

pub(crate) const fn default_max_attempts() -> u32 {
    5
}

pub(crate) const fn default_backoff_base_ms() -> u64 {
    1_000
}
