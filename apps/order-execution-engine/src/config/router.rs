//! Simulated venue configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::router::SimulatedRouterConfig;

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Minimum simulated latency in milliseconds.
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,
    /// Maximum simulated latency in milliseconds.
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
        }
    }
}

impl RouterConfig {
    /// Settings for the simulated router.
    #[must_use]
    pub fn simulated(&self) -> SimulatedRouterConfig {
        SimulatedRouterConfig {
            min_latency: Duration::from_millis(self.min_latency_ms),
            max_latency: Duration::from_millis(self.max_latency_ms),
            ..SimulatedRouterConfig::default()
        }
    }
}

pub(crate) const fn default_min_latency_ms() -> u64 {
    50
}

pub(crate) const fn default_max_latency_ms() -> u64 {
    250
}
