//! Order Aggregate Root
//!
//! The Order aggregate owns the requested amount, the executed portion and
//! the lifecycle status. Every state write goes through [`Order::transition`],
//! which clamps the fill and checks the status table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::services::OrderStateMachine;
use crate::domain::order_execution::value_objects::{
    OrderMeta, OrderSide, OrderStatus, OrderType,
};
use crate::domain::shared::{ClientId, OrderId, Symbol, Timestamp};

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Submitting client.
    pub client_id: ClientId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Requested amount.
    pub amount: Decimal,
    /// Limit price, time in force and free-form attributes.
    pub meta: OrderMeta,
}

impl CreateOrderCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if required parameters are missing or invalid.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.client_id.as_str().trim().is_empty() {
            return Err(OrderError::invalid("clientId", "Client ID cannot be empty"));
        }

        self.symbol.validate()?;

        if self.amount <= Decimal::ZERO {
            return Err(OrderError::invalid("amount", "Amount must be positive"));
        }

        match self.meta.limit_price {
            None if self.order_type.requires_limit_price() => Err(OrderError::invalid(
                "limitPrice",
                "Limit price required for limit orders",
            )),
            Some(price) if price <= Decimal::ZERO => Err(OrderError::invalid(
                "limitPrice",
                "Limit price must be positive",
            )),
            _ => Ok(()),
        }
    }
}

/// Order Aggregate Root.
///
/// Serialized in camelCase; this is both the stored row and the body of
/// `GET /orders/{id}`.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    client_id: ClientId,
    symbol: Symbol,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: OrderType,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    filled: Decimal,
    status: OrderStatus,
    #[serde(default)]
    meta: OrderMeta,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Create a new pending order from a command.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn new(cmd: CreateOrderCommand) -> Result<Self, OrderError> {
        cmd.validate()?;

        let now = Timestamp::now();
        Ok(Self {
            id: OrderId::generate(),
            client_id: cmd.client_id,
            symbol: cmd.symbol,
            side: cmd.side,
            order_type: cmd.order_type,
            amount: cmd.amount,
            filled: Decimal::ZERO,
            status: OrderStatus::Pending,
            meta: cmd.meta,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Get the submitting client.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Get the requested amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the executed amount.
    #[must_use]
    pub const fn filled(&self) -> Decimal {
        self.filled
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Get the metadata.
    #[must_use]
    pub const fn meta(&self) -> &OrderMeta {
        &self.meta
    }

    /// Get the limit price, if any.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Decimal> {
        self.meta.limit_price
    }

    /// Amount still to be executed.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.amount - self.filled
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Write a new fill and status.
    ///
    /// `filled` is clamped into `[0, amount]` and `updated_at` is refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidStateTransition`] if the status table
    /// forbids moving from the current status to `status`. The order is left
    /// untouched in that case.
    pub fn transition(&mut self, filled: Decimal, status: OrderStatus) -> Result<(), OrderError> {
        if !OrderStateMachine::can_transition(self.status, status) {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: status,
            });
        }

        self.filled = filled.clamp(Decimal::ZERO, self.amount);
        self.status = status;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_command(order_type: OrderType, limit_price: Option<Decimal>) -> CreateOrderCommand {
        CreateOrderCommand {
            client_id: ClientId::new("client-1"),
            symbol: Symbol::new("ETH/USDT"),
            side: OrderSide::Buy,
            order_type,
            amount: dec!(10),
            meta: OrderMeta {
                limit_price,
                ..OrderMeta::default()
            },
        }
    }

    #[test]
    fn new_order_is_pending_and_unfilled() {
        let order = Order::new(make_command(OrderType::Market, None)).unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.filled(), Decimal::ZERO);
        assert_eq!(order.remaining(), dec!(10));
        assert_eq!(order.created_at(), order.updated_at());
    }

    #[test]
    fn limit_order_requires_limit_price() {
        let err = Order::new(make_command(OrderType::Limit, None)).unwrap_err();
        assert!(err.to_string().contains("Limit price required"));
    }

    #[test]
    fn non_positive_amount_rejected() {
        let mut cmd = make_command(OrderType::Market, None);
        cmd.amount = Decimal::ZERO;
        assert!(Order::new(cmd).unwrap_err().is_validation());
    }

    #[test]
    fn non_positive_limit_price_rejected() {
        let cmd = make_command(OrderType::Limit, Some(dec!(-1)));
        assert!(Order::new(cmd).is_err());
    }

    #[test]
    fn empty_client_rejected() {
        let mut cmd = make_command(OrderType::Market, None);
        cmd.client_id = ClientId::new("  ");
        assert!(Order::new(cmd).is_err());
    }

    #[test]
    fn invalid_symbol_rejected() {
        let mut cmd = make_command(OrderType::Market, None);
        cmd.symbol = Symbol::new("");
        let err = Order::new(cmd).unwrap_err();
        assert!(matches!(err, OrderError::InvalidParameters { ref field, .. } if field == "symbol"));
    }

    #[test]
    fn transition_clamps_fill_to_amount() {
        let mut order = Order::new(make_command(OrderType::Market, None)).unwrap();
        order.transition(Decimal::ZERO, OrderStatus::Processing).unwrap();
        order.transition(dec!(12), OrderStatus::Filled).unwrap();

        assert_eq!(order.filled(), dec!(10));
        assert_eq!(order.status(), OrderStatus::Filled);
    }

    #[test]
    fn transition_clamps_negative_fill() {
        let mut order = Order::new(make_command(OrderType::Market, None)).unwrap();
        order.transition(dec!(-3), OrderStatus::Processing).unwrap();
        assert_eq!(order.filled(), Decimal::ZERO);
    }

    #[test]
    fn invalid_transition_leaves_order_untouched() {
        let mut order = Order::new(make_command(OrderType::Market, None)).unwrap();
        let before = order.clone();

        let err = order.transition(dec!(10), OrderStatus::Filled).unwrap_err();

        assert!(matches!(err, OrderError::InvalidStateTransition { .. }));
        assert_eq!(order, before);
    }

    #[test]
    fn serializes_camel_case_with_type_key() {
        let order = Order::new(make_command(OrderType::Limit, Some(dec!(100)))).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["type"], "limit");
        assert_eq!(json["clientId"], "client-1");
        assert_eq!(json["amount"], serde_json::json!(10.0));
        assert_eq!(json["filled"], serde_json::json!(0.0));
        assert_eq!(json["status"], "pending");
        assert_eq!(json["meta"]["limitPrice"], serde_json::json!(100.0));
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn deserializes_stored_row() {
        let order = Order::new(make_command(OrderType::Market, None)).unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), order.id());
        assert_eq!(back.amount(), dec!(10));
    }
}
