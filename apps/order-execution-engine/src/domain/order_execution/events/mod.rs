//! Domain events for order execution.
//!
//! Order updates are fanned out to subscribers as
//! `{"event": "order:update", "payload": {...}}`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aggregate::Order;
use super::value_objects::OrderStatus;
use crate::domain::shared::OrderId;

/// Event name carried by every order update.
pub const ORDER_UPDATE_EVENT: &str = "order:update";

/// Payload of an `order:update` event.
///
/// Optional fields are omitted from the JSON when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateEvent {
    /// Order ID.
    pub id: OrderId,
    /// Executed amount after the write.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub filled: Option<Decimal>,
    /// Status after the write.
    pub status: OrderStatus,
    /// Average execution price of the attempt.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub avg_price: Option<Decimal>,
    /// Why the order is in this status (non-match or failure message).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OrderUpdateEvent {
    /// Update for a successful execution, built from the stored row.
    #[must_use]
    pub fn executed(order: &Order, avg_price: Decimal) -> Self {
        Self {
            id: order.id().clone(),
            filled: Some(order.filled()),
            status: order.status(),
            avg_price: Some(avg_price),
            reason: None,
        }
    }

    /// Update carrying only a status and a reason.
    #[must_use]
    pub fn with_reason(id: OrderId, status: OrderStatus, reason: impl Into<String>) -> Self {
        Self {
            id,
            filled: None,
            status,
            avg_price: None,
            reason: Some(reason.into()),
        }
    }

    /// Update for a failed attempt, built from the row the store wrote.
    #[must_use]
    pub fn failed(order: &Order, reason: impl Into<String>) -> Self {
        Self::with_reason(order.id().clone(), order.status(), reason)
    }
}

/// Wire envelope for broadcast messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Event name.
    pub event: String,
    /// Event body.
    pub payload: T,
}
