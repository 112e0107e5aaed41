//! Domain errors shared across bounded contexts.

use thiserror::Error;

/// Domain-level errors raised by value object validation.
///
/// These errors are independent of infrastructure concerns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Invalid value for a field.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

impl DomainError {
    /// Shorthand for an [`DomainError::InvalidValue`].
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
