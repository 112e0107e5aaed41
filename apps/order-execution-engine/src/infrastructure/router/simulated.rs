//! Simulated DEX venue.
//!
//! Quotes a random price around a reference, sleeps for a random latency and
//! fills most of the requested amount with a little slippage. Limit orders
//! only execute when the quote crosses the limit.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use crate::application::ports::{ExecutionIntent, ExecutionRouterPort, RouterError};
use crate::domain::order_execution::value_objects::{
    ExecutionDiagnostics, ExecutionResult, OrderSide,
};

/// Decimal places kept on executed amounts and prices.
const RESULT_SCALE: u32 = 8;

/// Configuration for the simulated venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedRouterConfig {
    /// Minimum simulated latency.
    pub min_latency: Duration,
    /// Maximum simulated latency.
    pub max_latency: Duration,
    /// Centre of the quoted price range.
    pub reference_price: Decimal,
    /// Quotes fall within `reference_price ± price_band`.
    pub price_band: Decimal,
}

impl Default for SimulatedRouterConfig {
    fn default() -> Self {
        Self {
            min_latency: Duration::from_millis(50),
            max_latency: Duration::from_millis(250),
            reference_price: dec!(100),
            price_band: dec!(5),
        }
    }
}

impl SimulatedRouterConfig {
    /// Configuration without latency, for tests.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Market-order fill ratio range, in units of 1e-8.
const MARKET_FILL_RATIO: (i64, i64) = (90_000_000, 100_000_000);
/// Limit-order fill ratio range, in units of 1e-8.
const LIMIT_FILL_RATIO: (i64, i64) = (95_000_000, 100_000_000);
/// Maximum market-order slippage, in units of 1e-9 (0.5%).
const MARKET_MAX_SLIPPAGE: i64 = 5_000_000;
/// Maximum limit-order slippage, in units of 1e-9 (0.2%).
const LIMIT_MAX_SLIPPAGE: i64 = 2_000_000;

/// Simulated DEX router.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDexRouter {
    config: SimulatedRouterConfig,
}

impl SimulatedDexRouter {
    /// Create a router with the given configuration.
    #[must_use]
    pub const fn new(config: SimulatedRouterConfig) -> Self {
        Self { config }
    }

    /// Router configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulatedRouterConfig {
        &self.config
    }

    /// Random quote within the configured band.
    fn quote(&self) -> Decimal {
        let band = (self.config.price_band * dec!(100_000))
            .trunc()
            .to_i64()
            .unwrap_or(0)
            .abs();
        let offset = if band == 0 {
            0
        } else {
            rand::rng().random_range(-band..=band)
        };
        self.config.reference_price + Decimal::new(offset, 5)
    }

    async fn simulate_latency(&self) {
        let min = self.config.min_latency;
        let max = self.config.max_latency.max(min);
        let latency = if max.is_zero() {
            Duration::ZERO
        } else {
            rand::rng().random_range(min..=max)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn execute_market(&self, intent: &ExecutionIntent) -> ExecutionResult {
        let mid = self.quote();
        let filled_ratio = random_ratio(MARKET_FILL_RATIO);
        let slippage = signed_slippage(intent.side, MARKET_MAX_SLIPPAGE);

        ExecutionResult::new(
            (intent.amount * filled_ratio).round_dp(RESULT_SCALE),
            (mid * (Decimal::ONE + slippage)).round_dp(RESULT_SCALE),
        )
        .with_diagnostics(ExecutionDiagnostics {
            slippage_pct: Some(slippage),
            filled_ratio: Some(filled_ratio),
            ..ExecutionDiagnostics::default()
        })
    }

    fn execute_limit(&self, intent: &ExecutionIntent, limit_price: Decimal) -> ExecutionResult {
        let market_price = self.quote();
        let matched = match intent.side {
            OrderSide::Buy => market_price <= limit_price,
            OrderSide::Sell => market_price >= limit_price,
        };

        if !matched {
            return ExecutionResult::new(Decimal::ZERO, market_price).with_diagnostics(
                ExecutionDiagnostics {
                    price_match: Some(false),
                    market_price: Some(market_price),
                    limit_price: Some(limit_price),
                    ..ExecutionDiagnostics::default()
                },
            );
        }

        let filled_ratio = random_ratio(LIMIT_FILL_RATIO);
        let slippage = signed_slippage(intent.side, LIMIT_MAX_SLIPPAGE);

        ExecutionResult::new(
            (intent.amount * filled_ratio).round_dp(RESULT_SCALE),
            (limit_price * (Decimal::ONE + slippage)).round_dp(RESULT_SCALE),
        )
        .with_diagnostics(ExecutionDiagnostics {
            slippage_pct: Some(slippage),
            filled_ratio: Some(filled_ratio),
            price_match: Some(true),
            market_price: Some(market_price),
            limit_price: None,
        })
    }
}

fn random_ratio((low, high): (i64, i64)) -> Decimal {
    Decimal::new(rand::rng().random_range(low..=high), 8)
}

fn signed_slippage(side: OrderSide, max_units: i64) -> Decimal {
    let magnitude = Decimal::new(rand::rng().random_range(0..=max_units), 9);
    magnitude * Decimal::from(side.sign())
}

#[async_trait]
impl ExecutionRouterPort for SimulatedDexRouter {
    async fn execute(&self, intent: ExecutionIntent) -> Result<ExecutionResult, RouterError> {
        let limit_price = if intent.order_type.is_limit() {
            Some(intent.limit_price.ok_or(RouterError::LimitPriceRequired)?)
        } else {
            None
        };

        self.simulate_latency().await;

        let result = match limit_price {
            Some(limit) => self.execute_limit(&intent, limit),
            None => self.execute_market(&intent),
        };

        tracing::debug!(
            order_id = %intent.order_id,
            executed = %result.executed_amount,
            avg_price = %result.avg_price,
            "Simulated execution"
        );

        Ok(result)
    }
}
