//! Submit Order Use Case
//!
//! Validates an order, persists it as `pending` and queues it for execution.

use std::sync::Arc;

use thiserror::Error;

use crate::application::dto::{CreateOrderDto, SubmitOrderResponseDto};
use crate::application::ports::{EnqueueOutcome, ExecutionQueuePort, QueueError};
use crate::domain::order_execution::aggregate::Order;
use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::repository::OrderRepository;

/// Errors returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitOrderError {
    /// Validation or persistence failure.
    #[error(transparent)]
    Order(#[from] OrderError),
    /// The order was stored but could not be queued.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl SubmitOrderError {
    /// Returns true if the request itself was invalid.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Order(e) if e.is_validation())
    }
}

/// Use case for accepting a new order.
pub struct SubmitOrderUseCase<O, Q>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    order_repo: Arc<O>,
    queue: Arc<Q>,
}

impl<O, Q> SubmitOrderUseCase<O, Q>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    /// Create a new SubmitOrderUseCase.
    pub const fn new(order_repo: Arc<O>, queue: Arc<Q>) -> Self {
        Self { order_repo, queue }
    }

    /// Execute the use case.
    ///
    /// Nothing is persisted or queued when validation fails.
    pub async fn execute(
        &self,
        request: CreateOrderDto,
    ) -> Result<SubmitOrderResponseDto, SubmitOrderError> {
        let order = Order::new(request.into_command())?;
        let order = self.order_repo.create(order).await?;

        match self.queue.enqueue(order.clone()).await? {
            EnqueueOutcome::Enqueued => {
                tracing::info!(
                    order_id = %order.id(),
                    client_id = %order.client_id(),
                    symbol = %order.symbol(),
                    side = %order.side(),
                    order_type = %order.order_type(),
                    amount = %order.amount(),
                    "Order accepted"
                );
            }
            EnqueueOutcome::Duplicate => {
                tracing::debug!(order_id = %order.id(), "Order already queued");
            }
        }

        Ok(SubmitOrderResponseDto {
            id: order.id().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ExecutionJob, FailureDisposition, QueueCounts};
    use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus};
    use crate::domain::shared::OrderId;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct MockOrderRepo {
        orders: Mutex<HashMap<String, Order>>,
    }

    #[async_trait]
    impl OrderRepository for MockOrderRepo {
        async fn create(&self, order: Order) -> Result<Order, OrderError> {
            self.orders
                .lock()
                .entry(order.id().to_string())
                .or_insert_with(|| order.clone());
            Ok(order)
        }

        async fn update_filled(
            &self,
            _id: &OrderId,
            _filled: Decimal,
            _status: OrderStatus,
        ) -> Result<Option<Order>, OrderError> {
            Ok(None)
        }

        async fn get(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
            Ok(self.orders.lock().get(id.as_str()).cloned())
        }

        async fn check_connection(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct MockQueue {
        jobs: Mutex<Vec<OrderId>>,
        unavailable: bool,
    }

    #[async_trait]
    impl ExecutionQueuePort for MockQueue {
        async fn enqueue(&self, order: Order) -> Result<EnqueueOutcome, QueueError> {
            if self.unavailable {
                return Err(QueueError::Unavailable {
                    message: "queue down".to_string(),
                });
            }
            self.jobs.lock().push(order.id().clone());
            Ok(EnqueueOutcome::Enqueued)
        }

        async fn dequeue(&self) -> Result<Option<ExecutionJob>, QueueError> {
            Ok(None)
        }

        async fn next_job(&self, _shutdown: &CancellationToken) -> Option<ExecutionJob> {
            None
        }

        async fn release(&self, _id: &OrderId) -> Result<(), QueueError> {
            Ok(())
        }

        async fn complete(&self, _id: &OrderId) -> Result<(), QueueError> {
            Ok(())
        }

        async fn fail(&self, id: &OrderId, _reason: &str) -> Result<FailureDisposition, QueueError> {
            Err(QueueError::NotFound {
                job_id: id.to_string(),
            })
        }

        async fn fail_permanently(
            &self,
            id: &OrderId,
            reason: &str,
        ) -> Result<FailureDisposition, QueueError> {
            self.fail(id, reason).await
        }

        async fn job(&self, _id: &OrderId) -> Option<ExecutionJob> {
            None
        }

        async fn failed_jobs(&self) -> Vec<ExecutionJob> {
            vec![]
        }

        async fn counts(&self) -> QueueCounts {
            QueueCounts::default()
        }

        async fn is_reachable(&self) -> bool {
            !self.unavailable
        }
    }

    #[tokio::test]
    async fn valid_order_is_persisted_and_queued() {
        let repo = Arc::new(MockOrderRepo::default());
        let queue = Arc::new(MockQueue::default());
        let use_case = SubmitOrderUseCase::new(Arc::clone(&repo), Arc::clone(&queue));

        let response = use_case
            .execute(CreateOrderDto::market("client-1", "ETH/USDT", OrderSide::Buy, dec!(10)))
            .await
            .unwrap();

        let stored = repo.get(&response.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Pending);
        assert_eq!(stored.filled(), Decimal::ZERO);
        assert_eq!(queue.jobs.lock().as_slice(), &[response.id]);
    }

    #[tokio::test]
    async fn invalid_order_is_neither_persisted_nor_queued() {
        let repo = Arc::new(MockOrderRepo::default());
        let queue = Arc::new(MockQueue::default());
        let use_case = SubmitOrderUseCase::new(Arc::clone(&repo), Arc::clone(&queue));

        let mut dto = CreateOrderDto::market("client-1", "ETH/USDT", OrderSide::Buy, dec!(5));
        dto.order_type = crate::domain::order_execution::value_objects::OrderType::Limit;

        let err = use_case.execute(dto).await.unwrap_err();

        assert!(err.is_validation());
        assert!(repo.orders.lock().is_empty());
        assert!(queue.jobs.lock().is_empty());
    }

    #[tokio::test]
    async fn queue_failure_is_reported() {
        let repo = Arc::new(MockOrderRepo::default());
        let queue = Arc::new(MockQueue {
            unavailable: true,
            ..MockQueue::default()
        });
        let use_case = SubmitOrderUseCase::new(repo, queue);

        let err = use_case
            .execute(CreateOrderDto::market("client-1", "ETH/USDT", OrderSide::Buy, dec!(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitOrderError::Queue(_)));
        assert!(!err.is_validation());
    }
}
