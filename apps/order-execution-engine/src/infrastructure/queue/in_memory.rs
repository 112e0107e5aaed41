//! In-memory execution queue.
//!
//! Jobs are keyed by order ID. Ready jobs are served FIFO; retried jobs sit
//! in a delayed state until their backoff elapses. Successful jobs are
//! dropped, permanently failed jobs are kept for inspection.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::retry::RetryPolicy;
use crate::application::ports::{
    EnqueueOutcome, ExecutionJob, ExecutionQueuePort, FailureDisposition, QueueCounts, QueueError,
};
use crate::domain::order_execution::Order;
use crate::domain::shared::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Waiting,
    Delayed { run_at: Instant },
    Active,
    Failed,
}

#[derive(Debug)]
struct JobEntry {
    job: ExecutionJob,
    state: JobState,
}

impl JobEntry {
    /// Count a failed attempt and return the new total.
    fn record_failure(&mut self, reason: &str) -> u32 {
        self.job.attempts_made += 1;
        self.job.failed_reason = Some(reason.to_string());
        self.job.attempts_made
    }
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: HashMap<String, JobEntry>,
    ready: VecDeque<String>,
}

impl QueueState {
    /// Move delayed jobs whose backoff has elapsed to the ready list,
    /// earliest deadline first.
    fn promote_due(&mut self, now: Instant) {
        let mut due: Vec<(Instant, String)> = self
            .jobs
            .iter()
            .filter_map(|(id, entry)| match entry.state {
                JobState::Delayed { run_at } if run_at <= now => Some((run_at, id.clone())),
                _ => None,
            })
            .collect();
        due.sort();

        for (_, id) in due {
            if let Some(entry) = self.jobs.get_mut(&id) {
                entry.state = JobState::Waiting;
                self.ready.push_back(id);
            }
        }
    }

    fn take_ready(&mut self) -> Option<ExecutionJob> {
        self.promote_due(Instant::now());

        while let Some(id) = self.ready.pop_front() {
            if let Some(entry) = self.jobs.get_mut(&id)
                && entry.state == JobState::Waiting
            {
                entry.state = JobState::Active;
                return Some(entry.job.clone());
            }
        }
        None
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.jobs
            .values()
            .filter_map(|entry| match entry.state {
                JobState::Delayed { run_at } => Some(run_at),
                _ => None,
            })
            .min()
    }

    fn active_entry(&mut self, id: &OrderId) -> Result<&mut JobEntry, QueueError> {
        let entry = self
            .jobs
            .get_mut(id.as_str())
            .ok_or_else(|| QueueError::NotFound {
                job_id: id.to_string(),
            })?;
        if entry.state != JobState::Active {
            return Err(QueueError::NotActive {
                job_id: id.to_string(),
            });
        }
        Ok(entry)
    }
}

/// In-memory [`ExecutionQueuePort`] implementation.
///
/// Safe to share between any number of workers.
#[derive(Debug)]
pub struct InMemoryExecutionQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    policy: RetryPolicy,
}

impl InMemoryExecutionQueue {
    /// Create a queue with the given retry policy.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            policy,
        }
    }

    /// The retry policy applied to failed attempts.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

impl Default for InMemoryExecutionQueue {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

#[async_trait]
impl ExecutionQueuePort for InMemoryExecutionQueue {
    async fn enqueue(&self, order: Order) -> Result<EnqueueOutcome, QueueError> {
        let job = ExecutionJob::new(order);
        {
            let mut state = self.state.lock();
            if state.jobs.contains_key(job.id.as_str()) {
                return Ok(EnqueueOutcome::Duplicate);
            }
            let key = job.id.to_string();
            state.ready.push_back(key.clone());
            state.jobs.insert(
                key,
                JobEntry {
                    job,
                    state: JobState::Waiting,
                },
            );
        }
        self.notify.notify_one();
        Ok(EnqueueOutcome::Enqueued)
    }

    async fn dequeue(&self) -> Result<Option<ExecutionJob>, QueueError> {
        Ok(self.state.lock().take_ready())
    }

    async fn next_job(&self, shutdown: &CancellationToken) -> Option<ExecutionJob> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let deadline = {
                let mut state = self.state.lock();
                if let Some(job) = state.take_ready() {
                    return Some(job);
                }
                state.next_deadline()
            };

            let sleep_until = async {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                () = shutdown.cancelled() => return None,
                () = &mut notified => {}
                () = sleep_until => {}
            }
        }
    }

    async fn release(&self, id: &OrderId) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock();
            state.active_entry(id)?.state = JobState::Waiting;
            state.ready.push_front(id.to_string());
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn complete(&self, id: &OrderId) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        state.active_entry(id)?;
        state.jobs.remove(id.as_str());
        Ok(())
    }

    async fn fail(&self, id: &OrderId, reason: &str) -> Result<FailureDisposition, QueueError> {
        let disposition = {
            let mut state = self.state.lock();
            let entry = state.active_entry(id)?;
            let attempts = entry.record_failure(reason);
            let delay = self.policy.delay_for(attempts);

            match Instant::now().checked_add(delay) {
                Some(run_at) if self.policy.allows_retry(attempts) => {
                    entry.state = JobState::Delayed { run_at };
                    FailureDisposition::Retry {
                        attempt: attempts,
                        delay,
                    }
                }
                _ => {
                    entry.state = JobState::Failed;
                    FailureDisposition::Exhausted { attempts }
                }
            }
        };

        if matches!(disposition, FailureDisposition::Retry { .. }) {
            // Waiting workers recompute their wake-up deadline.
            self.notify.notify_one();
        }
        Ok(disposition)
    }

    async fn fail_permanently(
        &self,
        id: &OrderId,
        reason: &str,
    ) -> Result<FailureDisposition, QueueError> {
        let mut state = self.state.lock();
        let entry = state.active_entry(id)?;
        let attempts = entry.record_failure(reason);
        entry.state = JobState::Failed;
        Ok(FailureDisposition::Exhausted { attempts })
    }

    async fn job(&self, id: &OrderId) -> Option<ExecutionJob> {
        self.state
            .lock()
            .jobs
            .get(id.as_str())
            .map(|entry| entry.job.clone())
    }

    async fn failed_jobs(&self) -> Vec<ExecutionJob> {
        let state = self.state.lock();
        let mut failed: Vec<ExecutionJob> = state
            .jobs
            .values()
            .filter(|entry| entry.state == JobState::Failed)
            .map(|entry| entry.job.clone())
            .collect();
        failed.sort_by_key(|job| job.enqueued_at);
        failed
    }

    async fn counts(&self) -> QueueCounts {
        let state = self.state.lock();
        state
            .jobs
            .values()
            .fold(QueueCounts::default(), |mut counts, entry| {
                match entry.state {
                    JobState::Waiting => counts.waiting += 1,
                    JobState::Delayed { .. } => counts.delayed += 1,
                    JobState::Active => counts.active += 1,
                    JobState::Failed => counts.failed += 1,
                }
                counts
            })
    }

    async fn is_reachable(&self) -> bool {
        true
    }
}
