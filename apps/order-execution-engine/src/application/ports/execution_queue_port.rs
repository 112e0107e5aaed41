//! Execution Queue Port (Driven Port)
//!
//! Interface for the durable job queue feeding the worker pool. A job is
//! keyed by its order ID, so an order has at most one job at a time.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::domain::order_execution::Order;
use crate::domain::shared::{OrderId, Timestamp};

/// A queued unit of work for one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionJob {
    /// Job identity (the order ID).
    pub id: OrderId,
    /// Order snapshot taken at enqueue time.
    pub order: Order,
    /// Attempts that have failed so far.
    pub attempts_made: u32,
    /// When the job entered the queue.
    pub enqueued_at: Timestamp,
    /// Last failure message, kept for permanently failed jobs.
    pub failed_reason: Option<String>,
}

impl ExecutionJob {
    /// New job for an order.
    #[must_use]
    pub fn new(order: Order) -> Self {
        Self {
            id: order.id().clone(),
            order,
            attempts_made: 0,
            enqueued_at: Timestamp::now(),
            failed_reason: None,
        }
    }

    /// Attempt number of the next run, starting at 1.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempts_made + 1
    }
}

/// Result of an enqueue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new job was admitted.
    Enqueued,
    /// A job with the same ID already exists; nothing changed.
    Duplicate,
}

/// What the queue did with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// The job will run again after `delay`.
    Retry {
        /// Number of attempts made so far.
        attempt: u32,
        /// Backoff before the next attempt.
        delay: Duration,
    },
    /// Retry ceiling reached; the job is retained as failed.
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
    },
}

/// Job counts per queue state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    /// Ready to run.
    pub waiting: usize,
    /// Scheduled for a later retry.
    pub delayed: usize,
    /// Held by a worker.
    pub active: usize,
    /// Permanently failed and retained.
    pub failed: usize,
}

impl QueueCounts {
    /// Jobs that still have work to do.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.waiting + self.delayed + self.active
    }
}

/// Queue port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// No job with this ID.
    #[error("Job not found: {job_id}")]
    NotFound {
        /// Missing job ID.
        job_id: String,
    },

    /// The job exists but no worker holds it.
    #[error("Job {job_id} is not active")]
    NotActive {
        /// Job ID.
        job_id: String,
    },

    /// The queue backend could not be reached.
    #[error("Queue unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for the execution queue.
#[async_trait]
pub trait ExecutionQueuePort: Send + Sync {
    /// Admit a job for the order unless one with the same ID exists.
    ///
    /// A waiting, delayed, active or retained-failed job counts as existing.
    async fn enqueue(&self, order: Order) -> Result<EnqueueOutcome, QueueError>;

    /// Take the next ready job, if any, and mark it active.
    async fn dequeue(&self) -> Result<Option<ExecutionJob>, QueueError>;

    /// Wait for the next ready job. Returns `None` once `shutdown` fires.
    async fn next_job(&self, shutdown: &CancellationToken) -> Option<ExecutionJob>;

    /// Return an active job to the front of the ready list without
    /// counting an attempt.
    async fn release(&self, id: &OrderId) -> Result<(), QueueError>;

    /// Remove a successfully processed job.
    async fn complete(&self, id: &OrderId) -> Result<(), QueueError>;

    /// Record a failed attempt and decide between retry and retention.
    async fn fail(&self, id: &OrderId, reason: &str) -> Result<FailureDisposition, QueueError>;

    /// Record a failed attempt and retain the job as failed without
    /// retrying, whatever attempts remain. Always returns
    /// [`FailureDisposition::Exhausted`].
    async fn fail_permanently(
        &self,
        id: &OrderId,
        reason: &str,
    ) -> Result<FailureDisposition, QueueError>;

    /// Look up a job in any state.
    async fn job(&self, id: &OrderId) -> Option<ExecutionJob>;

    /// Permanently failed jobs.
    async fn failed_jobs(&self) -> Vec<ExecutionJob>;

    /// Job counts per state.
    async fn counts(&self) -> QueueCounts;

    /// Returns true if the queue backend is reachable.
    async fn is_reachable(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_pending_excludes_failed() {
        let counts = QueueCounts {
            waiting: 2,
            delayed: 1,
            active: 3,
            failed: 4,
        };
        assert_eq!(counts.pending(), 6);
    }

    #[test]
    fn queue_error_display() {
        let err = QueueError::NotActive {
            job_id: "ord-9".to_string(),
        };
        assert_eq!(err.to_string(), "Job ord-9 is not active");
    }
}
