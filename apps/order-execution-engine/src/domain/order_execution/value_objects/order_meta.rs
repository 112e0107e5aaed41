//! Open attribute bag carried by an order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TimeInForce;

/// Order metadata.
///
/// Known keys are typed; anything else supplied by the client is kept in
/// `extra` and round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMeta {
    /// Limit price, required for limit orders.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub limit_price: Option<Decimal>,
    /// Time in force (stored, not enforced).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
