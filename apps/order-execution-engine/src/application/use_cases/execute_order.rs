//! Execute Order Use Case
//!
//! One execution attempt for a queued job: mark the order `processing`,
//! route it, apply the fill-update rule, persist and broadcast.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

use crate::application::ports::{
    EventPublisherPort, ExecutionIntent, ExecutionJob, ExecutionRouterPort, RouterError,
};
use crate::domain::order_execution::aggregate::Order;
use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::events::OrderUpdateEvent;
use crate::domain::order_execution::repository::OrderRepository;
use crate::domain::order_execution::services::OrderStateMachine;
use crate::domain::order_execution::value_objects::OrderStatus;
use crate::domain::shared::{OrderId, Timestamp};
use crate::observability;

/// Error of a single execution attempt.
///
/// The display string is the `reason` broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The router failed.
    #[error(transparent)]
    Router(#[from] RouterError),
    /// The order store failed or rejected the write.
    #[error(transparent)]
    Store(#[from] OrderError),
}

impl ExecutionError {
    /// Returns true if running the job again cannot succeed.
    ///
    /// A vanished order, a refused status change and an order the venue
    /// cannot route fail the same way on every attempt.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Store(
                OrderError::NotFound { .. }
                    | OrderError::InvalidStateTransition { .. }
                    | OrderError::InvalidParameters { .. }
            ) | Self::Router(RouterError::LimitPriceRequired)
        )
    }

    /// Metrics label for the failing operation.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Router(_) => "execute",
            Self::Store(_) => "store",
        }
    }

    fn not_found(id: &OrderId) -> Self {
        Self::Store(OrderError::NotFound {
            order_id: id.to_string(),
        })
    }
}

/// Use case running one attempt of an execution job.
pub struct ExecuteOrderUseCase<O, R, P>
where
    O: OrderRepository,
    R: ExecutionRouterPort,
    P: EventPublisherPort,
{
    order_repo: Arc<O>,
    router: Arc<R>,
    publisher: Arc<P>,
}

impl<O, R, P> ExecuteOrderUseCase<O, R, P>
where
    O: OrderRepository,
    R: ExecutionRouterPort,
    P: EventPublisherPort,
{
    /// Create a new ExecuteOrderUseCase.
    pub const fn new(order_repo: Arc<O>, router: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            order_repo,
            router,
            publisher,
        }
    }

    /// Run one attempt for the job.
    ///
    /// On error the order is written back as `failed` with its previous fill
    /// and the error is returned so the queue can apply its retry policy.
    /// The `failed` update is broadcast only if the store accepted that
    /// write.
    ///
    /// Returns the stored order after the final write.
    pub async fn execute(&self, job: &ExecutionJob) -> Result<Order, ExecutionError> {
        match self.attempt(job).await {
            Ok(order) => Ok(order),
            Err(e) => {
                self.record_failure(job, &e).await;
                Err(e)
            }
        }
    }

    async fn attempt(&self, job: &ExecutionJob) -> Result<Order, ExecutionError> {
        let snapshot = &job.order;

        let processing = self
            .order_repo
            .update_filled(&job.id, snapshot.filled(), OrderStatus::Processing)
            .await?
            .ok_or_else(|| ExecutionError::not_found(&job.id))?;

        observability::record_queue_latency(Timestamp::now().elapsed_since(job.enqueued_at));

        tracing::debug!(
            order_id = %job.id,
            attempt = job.attempt(),
            "Executing order"
        );

        let started = Instant::now();
        let result = self
            .router
            .execute(ExecutionIntent::from_order(&processing))
            .await?;
        observability::record_execution_duration(
            processing.order_type().as_str(),
            processing.side().as_str(),
            started.elapsed(),
        );

        let decision = OrderStateMachine::apply_execution(&processing, &result);
        let stored = self
            .order_repo
            .update_filled(&job.id, decision.filled, decision.status)
            .await?
            .ok_or_else(|| ExecutionError::not_found(&job.id))?;

        let update = match decision.reason {
            Some(reason) => {
                OrderUpdateEvent::with_reason(stored.id().clone(), stored.status(), reason)
            }
            None => OrderUpdateEvent::executed(&stored, result.avg_price),
        };
        let delivered = self.publisher.publish(&update);

        let order_type = stored.order_type().as_str();
        let side = stored.side().as_str();
        observability::record_order(order_type, side, stored.status().as_str());
        if !stored.amount().is_zero() {
            let ratio = result.executed_amount / stored.amount();
            observability::record_fill_ratio(order_type, side, ratio.to_f64().unwrap_or(0.0));
        }

        tracing::info!(
            order_id = %stored.id(),
            status = %stored.status(),
            filled = %stored.filled(),
            remaining = %stored.remaining(),
            avg_price = %result.avg_price,
            reason = decision.reason.unwrap_or_default(),
            subscribers = delivered,
            "Order executed"
        );

        Ok(stored)
    }

    async fn record_failure(&self, job: &ExecutionJob, error: &ExecutionError) {
        let order = &job.order;

        tracing::error!(
            order_id = %job.id,
            attempt = job.attempt(),
            error = %error,
            "Order execution attempt failed"
        );

        match self
            .order_repo
            .update_filled(&job.id, order.filled(), OrderStatus::Failed)
            .await
        {
            Ok(Some(stored)) => {
                self.publisher
                    .publish(&OrderUpdateEvent::failed(&stored, error.to_string()));
            }
            Ok(None) => {
                tracing::warn!(order_id = %job.id, "Failed order no longer in store");
            }
            Err(e) => {
                tracing::warn!(order_id = %job.id, error = %e, "Order not marked failed");
            }
        }

        observability::record_order(
            order.order_type().as_str(),
            order.side().as_str(),
            OrderStatus::Failed.as_str(),
        );
        observability::record_order_error(order.order_type().as_str(), error.operation());
    }
}
