//! Order DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::aggregate::CreateOrderCommand;
use crate::domain::order_execution::value_objects::{
    OrderMeta, OrderSide, OrderType, TimeInForce,
};
use crate::domain::shared::{ClientId, OrderId, Symbol};

/// DTO for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderDto {
    /// Submitting client.
    pub client_id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Type.
    pub order_type: OrderType,
    /// Requested amount.
    pub amount: Decimal,
    /// Limit price.
    pub limit_price: Option<Decimal>,
    /// Time in force.
    pub time_in_force: Option<TimeInForce>,
    /// Extra client-supplied attributes stored with the order.
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CreateOrderDto {
    /// Market order with no extra attributes.
    #[must_use]
    pub fn market(
        client_id: impl Into<String>,
        symbol: impl Into<String>,
        side: OrderSide,
        amount: Decimal,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            amount,
            limit_price: None,
            time_in_force: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Limit order with no extra attributes.
    #[must_use]
    pub fn limit(
        client_id: impl Into<String>,
        symbol: impl Into<String>,
        side: OrderSide,
        amount: Decimal,
        limit_price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            ..Self::market(client_id, symbol, side, amount)
        }
    }

    /// Convert to the domain command.
    #[must_use]
    pub fn into_command(self) -> CreateOrderCommand {
        CreateOrderCommand {
            client_id: ClientId::new(self.client_id),
            symbol: Symbol::new(self.symbol),
            side: self.side,
            order_type: self.order_type,
            amount: self.amount,
            meta: OrderMeta {
                limit_price: self.limit_price,
                time_in_force: self.time_in_force,
                extra: self.extra,
            },
        }
    }
}

/// Response DTO for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderResponseDto {
    /// Assigned order ID.
    pub id: OrderId,
}
