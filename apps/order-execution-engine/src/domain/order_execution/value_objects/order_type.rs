//! Order type (market, limit, sniper).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type specifying execution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Market order - execute at best available price.
    #[default]
    Market,
    /// Limit order - execute only at the limit price or better.
    Limit,
    /// Sniper order - routed like a market order.
    Sniper,
}

impl OrderType {
    /// Returns true if this order type requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit)
    }

    /// Returns true if this order waits for a price match.
    #[must_use]
    pub const fn is_limit(&self) -> bool {
        matches!(self, Self::Limit)
    }

    /// Lowercase label used for metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Sniper => "sniper",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_limit_requires_limit_price() {
        assert!(!OrderType::Market.requires_limit_price());
        assert!(OrderType::Limit.requires_limit_price());
        assert!(!OrderType::Sniper.requires_limit_price());
    }

    #[test]
    fn default_is_market() {
        assert_eq!(OrderType::default(), OrderType::Market);
    }

    #[test]
    fn order_type_serde() {
        assert_eq!(serde_json::to_string(&OrderType::Sniper).unwrap(), "\"sniper\"");
        let parsed: OrderType = serde_json::from_str("\"limit\"").unwrap();
        assert_eq!(parsed, OrderType::Limit);
    }
}
