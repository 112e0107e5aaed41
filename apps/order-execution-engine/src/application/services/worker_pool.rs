//! Worker Pool
//!
//! Fixed set of tokio workers pulling jobs from the execution queue. A
//! semaphore bounds how many jobs run at once and a sliding-window limiter
//! bounds how many start per window. Job outcomes go to a separate
//! queue-event task.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::queue_events::{QueueEvent, run_queue_event_loop};
use super::rate_limiter::RateLimiter;
use crate::application::ports::{
    EventPublisherPort, ExecutionJob, ExecutionQueuePort, ExecutionRouterPort, FailureDisposition,
};
use crate::application::use_cases::ExecuteOrderUseCase;
use crate::domain::order_execution::repository::OrderRepository;

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of workers and maximum simultaneously active jobs.
    pub concurrency: usize,
    /// Maximum job starts per rate-limit window (0 disables limiting).
    pub rate_limit_max: usize,
    /// Length of the rate-limit window.
    pub rate_limit_window: Duration,
    /// Capacity of the queue-event channel.
    pub event_channel_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            rate_limit_max: 100,
            rate_limit_window: Duration::from_millis(60_000),
            event_channel_capacity: 1024,
        }
    }
}

/// Worker pool lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkerPoolError {
    /// `start` was called on a running pool.
    #[error("Worker pool is already running")]
    AlreadyRunning,
    /// `start` was called after `stop`.
    #[error("Worker pool has been stopped")]
    Stopped,
}

/// Pool of execution workers.
///
/// A stopped pool cannot be restarted.
pub struct WorkerPool<O, Q, R, P>
where
    O: OrderRepository + 'static,
    Q: ExecutionQueuePort + 'static,
    R: ExecutionRouterPort + 'static,
    P: EventPublisherPort + 'static,
{
    queue: Arc<Q>,
    executor: Arc<ExecuteOrderUseCase<O, R, P>>,
    config: WorkerPoolConfig,
    semaphore: Arc<Semaphore>,
    limiter: Arc<RateLimiter>,
    shutdown: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    event_task: Mutex<Option<JoinHandle<()>>>,
}

impl<O, Q, R, P> WorkerPool<O, Q, R, P>
where
    O: OrderRepository + 'static,
    Q: ExecutionQueuePort + 'static,
    R: ExecutionRouterPort + 'static,
    P: EventPublisherPort + 'static,
{
    /// Create a new pool. No worker runs until [`WorkerPool::start`].
    pub fn new(
        queue: Arc<Q>,
        executor: Arc<ExecuteOrderUseCase<O, R, P>>,
        config: WorkerPoolConfig,
    ) -> Self {
        let concurrency = config.concurrency.max(1);
        Self {
            queue,
            executor,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            limiter: Arc::new(RateLimiter::new(
                config.rate_limit_max,
                config.rate_limit_window,
            )),
            config,
            shutdown: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
            event_task: Mutex::new(None),
        }
    }

    /// Pool configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Returns true between `start` and `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled() && !self.workers.lock().is_empty()
    }

    /// Spawn the workers and the queue-event task.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool is running or has been stopped.
    pub fn start(&self) -> Result<(), WorkerPoolError> {
        if self.shutdown.is_cancelled() {
            return Err(WorkerPoolError::Stopped);
        }
        let mut workers = self.workers.lock();
        if !workers.is_empty() {
            return Err(WorkerPoolError::AlreadyRunning);
        }

        let (events_tx, events_rx) = mpsc::channel(self.config.event_channel_capacity.max(1));
        *self.event_task.lock() = Some(tokio::spawn(run_queue_event_loop(
            events_rx,
            Arc::clone(&self.queue),
        )));

        let concurrency = self.config.concurrency.max(1);
        for worker_id in 0..concurrency {
            let worker = Worker {
                id: worker_id,
                queue: Arc::clone(&self.queue),
                executor: Arc::clone(&self.executor),
                semaphore: Arc::clone(&self.semaphore),
                limiter: Arc::clone(&self.limiter),
                shutdown: self.shutdown.clone(),
                events: events_tx.clone(),
            };
            workers.push(tokio::spawn(worker.run()));
        }

        tracing::info!(
            concurrency,
            rate_limit_max = self.config.rate_limit_max,
            rate_limit_window_ms = self.config.rate_limit_window.as_millis() as u64,
            "Worker pool started"
        );
        Ok(())
    }

    /// Stop taking new jobs and wait for in-flight jobs to finish.
    ///
    /// Calling `stop` more than once is a no-op.
    pub async fn stop(&self) {
        let was_running = self.is_running();
        self.shutdown.cancel();

        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }

        let event_task = self.event_task.lock().take();
        if let Some(handle) = event_task
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "Queue event task panicked");
        }

        if was_running {
            tracing::info!("Worker pool stopped");
        }
    }
}

struct Worker<O, Q, R, P>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
    R: ExecutionRouterPort,
    P: EventPublisherPort,
{
    id: usize,
    queue: Arc<Q>,
    executor: Arc<ExecuteOrderUseCase<O, R, P>>,
    semaphore: Arc<Semaphore>,
    limiter: Arc<RateLimiter>,
    shutdown: CancellationToken,
    events: mpsc::Sender<QueueEvent>,
}

impl<O, Q, R, P> Worker<O, Q, R, P>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
    R: ExecutionRouterPort,
    P: EventPublisherPort,
{
    async fn run(self) {
        tracing::debug!(worker_id = self.id, "Worker started");

        loop {
            let permit = tokio::select! {
                () = self.shutdown.cancelled() => break,
                permit = Arc::clone(&self.semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let Some(job) = self.queue.next_job(&self.shutdown).await else {
                break;
            };

            let admitted = tokio::select! {
                () = self.shutdown.cancelled() => false,
                () = self.limiter.acquire() => true,
            };
            if !admitted {
                if let Err(e) = self.queue.release(&job.id).await {
                    tracing::warn!(job_id = %job.id, error = %e, "Failed to release job");
                }
                break;
            }

            let event = self.process(job).await;
            drop(permit);

            if let Some(event) = event
                && let Err(e) = self.events.try_send(event)
            {
                tracing::warn!(error = %e, "Dropping queue event");
            }
        }

        tracing::debug!(worker_id = self.id, "Worker stopped");
    }

    async fn process(&self, job: ExecutionJob) -> Option<QueueEvent> {
        match self.executor.execute(&job).await {
            Ok(order) => {
                if let Err(e) = self.queue.complete(&job.id).await {
                    tracing::error!(job_id = %job.id, error = %e, "Failed to complete job");
                    return None;
                }
                Some(QueueEvent::Completed {
                    job_id: job.id,
                    status: order.status(),
                })
            }
            Err(error) => {
                let reason = error.to_string();
                let recorded = if error.is_terminal() {
                    self.queue.fail_permanently(&job.id, &reason).await
                } else {
                    self.queue.fail(&job.id, &reason).await
                };
                match recorded {
                    Ok(FailureDisposition::Retry { attempt, delay }) => Some(QueueEvent::Retrying {
                        job_id: job.id,
                        attempt,
                        delay,
                        reason,
                    }),
                    Ok(FailureDisposition::Exhausted { attempts }) => Some(QueueEvent::Failed {
                        job_id: job.id,
                        attempts,
                        reason,
                    }),
                    Err(e) => {
                        tracing::error!(job_id = %job.id, error = %e, "Failed to record job failure");
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockExecutionRouterPort, NoOpEventPublisher};
    use crate::domain::order_execution::aggregate::{CreateOrderCommand, Order};
    use crate::domain::order_execution::value_objects::{OrderMeta, OrderSide, OrderType};
    use crate::domain::shared::{ClientId, Symbol};
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use crate::infrastructure::queue::InMemoryExecutionQueue;
    use rust_decimal_macros::dec;

    fn make_pool() -> WorkerPool<
        InMemoryOrderRepository,
        InMemoryExecutionQueue,
        MockExecutionRouterPort,
        NoOpEventPublisher,
    > {
        let executor = ExecuteOrderUseCase::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(MockExecutionRouterPort::new()),
            Arc::new(NoOpEventPublisher),
        );
        WorkerPool::new(
            Arc::new(InMemoryExecutionQueue::default()),
            Arc::new(executor),
            WorkerPoolConfig {
                concurrency: 2,
                ..WorkerPoolConfig::default()
            },
        )
    }

    #[test]
    fn default_config() {
        let config = WorkerPoolConfig::default();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn start_stop_lifecycle() {
        let pool = make_pool();
        assert!(!pool.is_running());

        pool.start().unwrap();
        assert!(pool.is_running());
        assert_eq!(pool.start(), Err(WorkerPoolError::AlreadyRunning));

        tokio::time::timeout(Duration::from_secs(1), pool.stop())
            .await
            .unwrap();
        assert!(!pool.is_running());
        assert_eq!(pool.start(), Err(WorkerPoolError::Stopped));

        pool.stop().await;
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let pool = make_pool();
        tokio::time::timeout(Duration::from_secs(1), pool.stop())
            .await
            .unwrap();
        assert!(!pool.is_running());
        assert_eq!(pool.start(), Err(WorkerPoolError::Stopped));
    }

    #[tokio::test]
    async fn terminal_failure_is_not_retried() {
        let pool = make_pool();
        let order = Order::new(CreateOrderCommand {
            client_id: ClientId::new("client-1"),
            symbol: Symbol::new("ETH/USDT"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            amount: dec!(1),
            meta: OrderMeta::default(),
        })
        .unwrap();
        // Queued but never stored, and the router has no expectations.
        pool.queue.enqueue(order).await.unwrap();
        let job = pool.queue.dequeue().await.unwrap().unwrap();

        let (events, _events_rx) = mpsc::channel(1);
        let worker = Worker {
            id: 0,
            queue: Arc::clone(&pool.queue),
            executor: Arc::clone(&pool.executor),
            semaphore: Arc::clone(&pool.semaphore),
            limiter: Arc::clone(&pool.limiter),
            shutdown: pool.shutdown.clone(),
            events,
        };

        let event = worker.process(job).await;

        assert!(matches!(event, Some(QueueEvent::Failed { attempts: 1, .. })));
        assert_eq!(pool.queue.counts().await.failed, 1);
        assert!(pool.queue.dequeue().await.unwrap().is_none());
    }
}
