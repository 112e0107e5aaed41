//! Outcome of a single execution attempt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Venue-specific diagnostics attached to an execution result.
///
/// All fields are optional; routers fill in what they know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDiagnostics {
    /// Signed slippage applied to the reference price, as a fraction
    /// (`0.001` is 0.1%).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub slippage_pct: Option<Decimal>,
    /// Fraction of the requested amount that was executed.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub filled_ratio: Option<Decimal>,
    /// Whether a limit price was matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_match: Option<bool>,
    /// Quoted market price at execution time.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub market_price: Option<Decimal>,
    /// Limit price the quote was compared against.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub limit_price: Option<Decimal>,
}

/// Result of routing an order to the venue.
///
/// Produced fresh per attempt and never persisted as such.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Quantity executed in this attempt (may be zero).
    #[serde(with = "rust_decimal::serde::float")]
    pub executed_amount: Decimal,
    /// Average execution price (or the quoted price on a non-match).
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_price: Decimal,
    /// Router diagnostics.
    #[serde(default)]
    pub diagnostics: ExecutionDiagnostics,
}

impl ExecutionResult {
    /// Create a result without diagnostics.
    #[must_use]
    pub fn new(executed_amount: Decimal, avg_price: Decimal) -> Self {
        Self {
            executed_amount,
            avg_price,
            diagnostics: ExecutionDiagnostics::default(),
        }
    }

    /// Attach diagnostics.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: ExecutionDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns true if nothing was executed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executed_amount.is_zero()
    }
}
