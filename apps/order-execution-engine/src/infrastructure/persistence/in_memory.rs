//! In-memory order store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::domain::order_execution::aggregate::Order;
use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::repository::OrderRepository;
use crate::domain::order_execution::value_objects::OrderStatus;
use crate::domain::shared::OrderId;

/// In-memory implementation of `OrderRepository`.
///
/// Each write happens under the map's write lock, so a fill/status update is
/// atomic with respect to concurrent readers and writers.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of orders in the repository.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> Result<Order, OrderError> {
        let mut orders = self.orders.write();
        if orders.contains_key(order.id().as_str()) {
            tracing::debug!(order_id = %order.id(), "Order already stored, ignoring create");
        } else {
            orders.insert(order.id().to_string(), order.clone());
        }
        Ok(order)
    }

    async fn update_filled(
        &self,
        id: &OrderId,
        filled: Decimal,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        let mut orders = self.orders.write();
        let Some(order) = orders.get_mut(id.as_str()) else {
            return Ok(None);
        };
        order.transition(filled, status)?;
        Ok(Some(order.clone()))
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.read().get(id.as_str()).cloned())
    }

    async fn check_connection(&self) -> bool {
        true
    }
}
