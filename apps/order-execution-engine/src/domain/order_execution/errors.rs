//! Order execution errors.

use thiserror::Error;

use super::value_objects::OrderStatus;
use crate::domain::shared::DomainError;

/// Errors raised by the order aggregate and the order store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Invalid order parameters (rejected before persistence).
    #[error("Invalid order parameter '{field}': {message}")]
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// Order ID.
        order_id: String,
    },

    /// Invalid state transition attempted.
    #[error("Invalid order state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
    },

    /// The backing store could not complete the operation.
    #[error("Order store error: {0}")]
    Storage(String),
}

impl OrderError {
    /// Shorthand for [`OrderError::InvalidParameters`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error is a client-side validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidParameters { .. })
    }
}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidValue { field, message } => {
                Self::InvalidParameters { field, message }
            }
        }
    }
}
