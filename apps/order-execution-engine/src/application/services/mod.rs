//! Application Services
//!
//! Long-running orchestration around the use cases.

mod queue_events;
mod rate_limiter;
mod worker_pool;

pub use queue_events::{QueueEvent, run_queue_event_loop};
pub use rate_limiter::RateLimiter;
pub use worker_pool::{WorkerPool, WorkerPoolConfig, WorkerPoolError};
