//! Time in force.
//!
//! Carried on [`super::OrderMeta`] and echoed back to clients. The pipeline
//! never expires or cancels an order because of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-requested validity of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good till cancel.
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
}

impl TimeInForce {
    /// Wire code as submitted by clients.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Gtc => "GTC",
            Self::Ioc => "IOC",
            Self::Fok => "FOK",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(TimeInForce::Gtc, "\"GTC\"" ; "good till cancel")]
    #[test_case(TimeInForce::Ioc, "\"IOC\"" ; "immediate or cancel")]
    #[test_case(TimeInForce::Fok, "\"FOK\"" ; "fill or kill")]
    fn wire_code_matches_display(tif: TimeInForce, json: &str) {
        assert_eq!(serde_json::to_string(&tif).unwrap(), json);
        assert_eq!(format!("\"{tif}\""), json);
        let parsed: TimeInForce = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, tif);
    }

    #[test]
    fn lowercase_code_rejected() {
        assert!(serde_json::from_str::<TimeInForce>("\"gtc\"").is_err());
    }
}
