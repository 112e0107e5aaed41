//! Execution Router Port (Driven Port)
//!
//! Interface for routing an order to a venue and getting back what was
//! executed.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::Order;
use crate::domain::order_execution::value_objects::{
    ExecutionResult, OrderSide, OrderType, TimeInForce,
};
use crate::domain::shared::{OrderId, Symbol};

/// What the router is asked to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionIntent {
    /// Order being executed.
    pub order_id: OrderId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Requested amount.
    pub amount: Decimal,
    /// Limit price (for limit orders).
    pub limit_price: Option<Decimal>,
    /// Time in force.
    pub time_in_force: Option<TimeInForce>,
}

impl ExecutionIntent {
    /// Build the intent for an order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id().clone(),
            symbol: order.symbol().clone(),
            side: order.side(),
            order_type: order.order_type(),
            amount: order.amount(),
            limit_price: order.limit_price(),
            time_in_force: order.meta().time_in_force,
        }
    }
}

/// Router port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// A limit order arrived without a limit price.
    #[error("Limit price required for limit orders")]
    LimitPriceRequired,

    /// The venue could not be reached.
    #[error("Venue unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// The venue refused the order.
    #[error("Execution rejected: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },
}

/// Port for order execution.
///
/// Implementations may be called concurrently from every worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionRouterPort: Send + Sync {
    /// Execute an order and report the executed amount and price.
    async fn execute(&self, intent: ExecutionIntent) -> Result<ExecutionResult, RouterError>;
}
