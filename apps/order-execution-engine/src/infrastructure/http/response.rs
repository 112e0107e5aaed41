//! HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::application::ports::QueueCounts;

/// Dependency state reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    /// Reachable.
    Connected,
    /// Unreachable.
    Error,
}

impl From<bool> for DependencyStatus {
    fn from(ok: bool) -> Self {
        if ok { Self::Connected } else { Self::Error }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is connected, otherwise `error`.
    pub status: String,
    /// Order store state.
    pub store: DependencyStatus,
    /// Execution queue state.
    pub queue: DependencyStatus,
    /// Job counts by state.
    #[serde(rename = "jobs")]
    pub counts: QueueCounts,
    /// Application version.
    pub version: String,
    /// Time of the check (RFC 3339).
    pub timestamp: String,
}

impl HealthResponse {
    /// Returns true when the service is fully healthy.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}
