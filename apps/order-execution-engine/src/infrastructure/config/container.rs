//! Dependency Injection Container
//!
//! Manages creation and wiring of all application components.

use std::sync::Arc;

use crate::application::ports::{ExecutionQueuePort, ExecutionRouterPort};
use crate::application::services::{WorkerPool, WorkerPoolConfig};
use crate::application::use_cases::{ExecuteOrderUseCase, SubmitOrderUseCase};
use crate::domain::order_execution::repository::OrderRepository;
use crate::infrastructure::broadcast::SubscriberRegistry;
use crate::infrastructure::http::AppState;

/// Dependency injection container.
///
/// Holds the shared store, queue, router and subscriber registry. The
/// registry is both the event publisher for workers and the connection set
/// for the WebSocket endpoint.
pub struct Container<O, Q, R>
where
    O: OrderRepository + 'static,
    Q: ExecutionQueuePort + 'static,
    R: ExecutionRouterPort + 'static,
{
    order_repo: Arc<O>,
    queue: Arc<Q>,
    router: Arc<R>,
    subscribers: Arc<SubscriberRegistry>,
}

impl<O, Q, R> Container<O, Q, R>
where
    O: OrderRepository + 'static,
    Q: ExecutionQueuePort + 'static,
    R: ExecutionRouterPort + 'static,
{
    /// Create a new container with all dependencies.
    pub const fn new(
        order_repo: Arc<O>,
        queue: Arc<Q>,
        router: Arc<R>,
        subscribers: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            order_repo,
            queue,
            router,
            subscribers,
        }
    }

    /// Get the order repository.
    pub fn order_repo(&self) -> Arc<O> {
        Arc::clone(&self.order_repo)
    }

    /// Get the execution queue.
    pub fn queue(&self) -> Arc<Q> {
        Arc::clone(&self.queue)
    }

    /// Get the execution router.
    pub fn router(&self) -> Arc<R> {
        Arc::clone(&self.router)
    }

    /// Get the subscriber registry.
    pub fn subscribers(&self) -> Arc<SubscriberRegistry> {
        Arc::clone(&self.subscribers)
    }

    /// Create a `SubmitOrderUseCase`.
    pub fn submit_order_use_case(&self) -> SubmitOrderUseCase<O, Q> {
        SubmitOrderUseCase::new(Arc::clone(&self.order_repo), Arc::clone(&self.queue))
    }

    /// Create an `ExecuteOrderUseCase` publishing to the registry.
    pub fn execute_order_use_case(&self) -> ExecuteOrderUseCase<O, R, SubscriberRegistry> {
        ExecuteOrderUseCase::new(
            Arc::clone(&self.order_repo),
            Arc::clone(&self.router),
            Arc::clone(&self.subscribers),
        )
    }

    /// Create a worker pool over the queue. Call `start` to run it.
    pub fn worker_pool(&self, config: WorkerPoolConfig) -> WorkerPool<O, Q, R, SubscriberRegistry> {
        WorkerPool::new(
            Arc::clone(&self.queue),
            Arc::new(self.execute_order_use_case()),
            config,
        )
    }

    /// Create the HTTP application state.
    pub fn app_state(&self, version: impl Into<String>) -> AppState<O, Q> {
        AppState {
            submit_order: Arc::new(self.submit_order_use_case()),
            order_repo: Arc::clone(&self.order_repo),
            queue: Arc::clone(&self.queue),
            subscribers: Arc::clone(&self.subscribers),
            version: version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::CreateOrderDto;
    use crate::domain::order_execution::value_objects::OrderSide;
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use crate::infrastructure::queue::InMemoryExecutionQueue;
    use crate::infrastructure::router::{SimulatedDexRouter, SimulatedRouterConfig};
    use rust_decimal_macros::dec;

    fn container() -> Container<InMemoryOrderRepository, InMemoryExecutionQueue, SimulatedDexRouter>
    {
        Container::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryExecutionQueue::default()),
            Arc::new(SimulatedDexRouter::new(SimulatedRouterConfig::instant())),
            Arc::new(SubscriberRegistry::new()),
        )
    }

    #[tokio::test]
    async fn use_cases_share_the_same_store_and_queue() {
        let container = container();

        let response = container
            .submit_order_use_case()
            .execute(CreateOrderDto::market("c-1", "ETH/USDT", OrderSide::Buy, dec!(1)))
            .await
            .unwrap();

        assert!(container.order_repo().get(&response.id).await.unwrap().is_some());
        assert!(container.queue().job(&response.id).await.is_some());
    }

    #[test]
    fn app_state_carries_version() {
        let state = container().app_state("9.9.9");
        assert_eq!(state.version, "9.9.9");
        assert_eq!(state.subscribers.connection_count(), 0);
    }

    #[test]
    fn worker_pool_is_idle_until_started() {
        let pool = container().worker_pool(WorkerPoolConfig::default());
        assert!(!pool.is_running());
    }
}
