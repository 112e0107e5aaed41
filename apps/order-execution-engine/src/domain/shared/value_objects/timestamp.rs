//! Wall-clock instants for order records and queue bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// UTC instant, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current instant.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Time from `earlier` to `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Self) -> Duration {
        (self.0 - earlier.0).to_std().unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> Timestamp {
        let dt = Utc.with_ymd_and_hms(2026, 1, 19, h, m, s).unwrap()
            + chrono::Duration::milliseconds(i64::from(ms));
        Timestamp::from(dt)
    }

    #[test]
    fn elapsed_since_measures_forward_gap() {
        let enqueued = at(12, 0, 0, 0);
        let started = at(12, 0, 1, 500);
        assert_eq!(started.elapsed_since(enqueued), Duration::from_millis(1500));
    }

    #[test]
    fn elapsed_since_clamps_negative_gap() {
        assert_eq!(at(12, 0, 0, 0).elapsed_since(at(13, 0, 0, 0)), Duration::ZERO);
    }

    #[test]
    fn serializes_as_rfc3339() {
        let json = serde_json::to_string(&at(12, 0, 0, 0)).unwrap();
        assert_eq!(json, "\"2026-01-19T12:00:00Z\"");

        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, at(12, 0, 0, 0));
    }

    #[test]
    fn now_is_monotonic_enough_for_ordering() {
        let first = Timestamp::now();
        let second = Timestamp::now();
        assert!(first <= second);
    }
}
