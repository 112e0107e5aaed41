//! Order status in the execution lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status as persisted and broadcast.
///
/// Lifecycle: `pending -> processing -> {filled | pending | failed}`.
/// `cancelled` exists in the schema but is never produced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted and waiting for (another) execution attempt.
    #[default]
    Pending,
    /// A worker holds the job and is executing it.
    Processing,
    /// Fully executed.
    Filled,
    /// The last execution attempt failed.
    Failed,
    /// Cancelled (reserved).
    Cancelled,
}

impl OrderStatus {
    /// Lowercase label used on the wire and in metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Filled => "filled",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"filled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Filled);
    }

    #[test_case(OrderStatus::Pending, "pending")]
    #[test_case(OrderStatus::Processing, "processing")]
    #[test_case(OrderStatus::Filled, "filled")]
    #[test_case(OrderStatus::Failed, "failed")]
    #[test_case(OrderStatus::Cancelled, "cancelled")]
    fn display_matches_wire_format(status: OrderStatus, label: &str) {
        assert_eq!(status.to_string(), label);
    }
}
