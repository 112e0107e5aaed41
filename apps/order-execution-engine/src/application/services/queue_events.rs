//! Queue outcome events.
//!
//! Workers report job outcomes on an mpsc channel. A dedicated task logs them
//! and records metrics so the execution path never waits on either.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::ports::ExecutionQueuePort;
use crate::domain::order_execution::value_objects::OrderStatus;
use crate::domain::shared::OrderId;
use crate::observability;

/// Outcome of one job attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// The attempt succeeded and the job was removed.
    Completed {
        /// Job ID.
        job_id: OrderId,
        /// Order status after the attempt.
        status: OrderStatus,
    },
    /// The attempt failed and the job will run again.
    Retrying {
        /// Job ID.
        job_id: OrderId,
        /// Attempts made so far.
        attempt: u32,
        /// Backoff before the next attempt.
        delay: Duration,
        /// Failure message.
        reason: String,
    },
    /// The retry ceiling was reached; the job is retained as failed.
    Failed {
        /// Job ID.
        job_id: OrderId,
        /// Attempts made.
        attempts: u32,
        /// Last failure message.
        reason: String,
    },
}

impl QueueEvent {
    /// Metrics label for the outcome.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Retrying { .. } => "retrying",
            Self::Failed { .. } => "failed",
        }
    }

    /// Job the event is about.
    #[must_use]
    pub const fn job_id(&self) -> &OrderId {
        match self {
            Self::Completed { job_id, .. }
            | Self::Retrying { job_id, .. }
            | Self::Failed { job_id, .. } => job_id,
        }
    }
}

/// Consume queue events until every sender is dropped.
pub async fn run_queue_event_loop<Q>(mut events: mpsc::Receiver<QueueEvent>, queue: Arc<Q>)
where
    Q: ExecutionQueuePort,
{
    while let Some(event) = events.recv().await {
        match &event {
            QueueEvent::Completed { job_id, status } => {
                tracing::info!(job_id = %job_id, status = %status, "Job completed");
            }
            QueueEvent::Retrying {
                job_id,
                attempt,
                delay,
                reason,
            } => {
                tracing::warn!(
                    job_id = %job_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "Job attempt failed, retrying"
                );
            }
            QueueEvent::Failed {
                job_id,
                attempts,
                reason,
            } => {
                tracing::error!(
                    job_id = %job_id,
                    attempts,
                    reason = %reason,
                    "Job failed permanently"
                );
            }
        }

        observability::record_job_outcome(event.outcome());
        observability::update_queue_size(queue.counts().await.pending());
    }

    tracing::debug!("Queue event channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::queue::InMemoryExecutionQueue;

    #[test]
    fn outcome_labels() {
        let id = OrderId::new("ord-1");
        let completed = QueueEvent::Completed {
            job_id: id.clone(),
            status: OrderStatus::Filled,
        };
        let retrying = QueueEvent::Retrying {
            job_id: id.clone(),
            attempt: 1,
            delay: Duration::from_secs(1),
            reason: "boom".to_string(),
        };
        let failed = QueueEvent::Failed {
            job_id: id.clone(),
            attempts: 5,
            reason: "boom".to_string(),
        };

        assert_eq!(completed.outcome(), "completed");
        assert_eq!(retrying.outcome(), "retrying");
        assert_eq!(failed.outcome(), "failed");
        assert_eq!(failed.job_id(), &id);
    }

    #[tokio::test]
    async fn loop_ends_when_senders_drop() {
        let (tx, rx) = mpsc::channel(4);
        let queue = Arc::new(InMemoryExecutionQueue::default());
        let handle = tokio::spawn(run_queue_event_loop(rx, queue));

        tx.send(QueueEvent::Completed {
            job_id: OrderId::new("ord-1"),
            status: OrderStatus::Filled,
        })
        .await
        .unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
