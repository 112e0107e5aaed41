//! Order Repository Trait
//!
//! Defines the persistence abstraction for orders.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::aggregate::Order;
use super::errors::OrderError;
use super::value_objects::OrderStatus;
use crate::domain::shared::OrderId;

/// Repository trait for Order persistence.
///
/// The store exclusively owns the persisted record. Callers derive final
/// state from the values it returns, never from their own copies.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order if no order with the same ID exists.
    ///
    /// A conflicting ID is silently ignored; the input order is returned
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn create(&self, order: Order) -> Result<Order, OrderError>;

    /// Atomically set the fill and status of an order.
    ///
    /// Returns the updated row, or `None` if the order is unknown.
    ///
    /// # Errors
    ///
    /// Returns error if the status transition is not allowed or
    /// persistence fails.
    async fn update_filled(
        &self,
        id: &OrderId,
        filled: Decimal,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError>;

    /// Find an order by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn get(&self, id: &OrderId) -> Result<Option<Order>, OrderError>;

    /// Returns true if the backing store is reachable.
    async fn check_connection(&self) -> bool;
}
