//! Symbol value object for traded pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Maximum accepted symbol length.
const MAX_SYMBOL_LEN: usize = 32;

/// A trading symbol, usually a `BASE/QUOTE` pair.
///
/// Examples: "ETH/USDT", "SOL-USDC", "BTC".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is trimmed and normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset of a pair (the part before `/` or `-`).
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.split(['/', '-']).next().unwrap_or(&self.0)
    }

    /// Validate the symbol for order submission.
    ///
    /// # Errors
    ///
    /// Returns error if symbol is empty, too long or contains invalid characters.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::invalid("symbol", "Symbol cannot be empty"));
        }

        if self.0.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::invalid(
                "symbol",
                "Symbol exceeds maximum length",
            ));
        }

        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
        {
            return Err(DomainError::invalid(
                "symbol",
                "Symbol contains invalid characters",
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
