//! Order State Machine Service
//!
//! Status transition table and the fill-update rule applied after each
//! execution attempt.

use rust_decimal::Decimal;

use crate::domain::order_execution::aggregate::Order;
use crate::domain::order_execution::value_objects::{ExecutionResult, OrderStatus};

/// Reason attached to the update of a limit order whose price did not match.
pub const PRICE_NOT_MATCHED: &str = "Price not matched";

/// Fill and status to persist after an execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillDecision {
    /// New executed amount.
    pub filled: Decimal,
    /// New status.
    pub status: OrderStatus,
    /// Human-readable reason, set only for a limit non-match.
    pub reason: Option<&'static str>,
}

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a status transition is allowed.
    ///
    /// `failed -> processing` is allowed so a retried job can supersede
    /// an earlier failed attempt.
    #[must_use]
    pub const fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (
                OrderStatus::Pending,
                OrderStatus::Processing | OrderStatus::Failed | OrderStatus::Cancelled
            ) | (
                OrderStatus::Processing,
                OrderStatus::Filled | OrderStatus::Pending | OrderStatus::Failed
            ) | (OrderStatus::Failed, OrderStatus::Processing | OrderStatus::Failed)
        )
    }

    /// Derive the fill and status to persist from an execution result.
    ///
    /// A limit order with nothing executed keeps its previous fill and goes
    /// back to `pending`. Otherwise the latest attempt is treated as a full
    /// re-quote: the fill becomes `min(amount, executed)` and the order is
    /// `filled` once that reaches the requested amount.
    #[must_use]
    pub fn apply_execution(order: &Order, result: &ExecutionResult) -> FillDecision {
        if result.is_empty() && order.order_type().is_limit() {
            return FillDecision {
                filled: order.filled(),
                status: OrderStatus::Pending,
                reason: Some(PRICE_NOT_MATCHED),
            };
        }

        let filled = order.amount().min(result.executed_amount).max(Decimal::ZERO);
        let status = if filled >= order.amount() {
            OrderStatus::Filled
        } else {
            OrderStatus::Pending
        };

        FillDecision {
            filled,
            status,
            reason: None,
        }
    }
}
