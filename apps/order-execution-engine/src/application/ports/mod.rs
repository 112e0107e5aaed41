//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driven Ports** (Secondary/Outbound): the execution venue, the job
//!   queue and the subscriber fan-out

mod event_publisher_port;
mod execution_queue_port;
mod execution_router_port;

pub use event_publisher_port::{
    BroadcastError, EventPublisherPort, NoOpEventPublisher, SubscriberSink,
};
pub use execution_queue_port::{
    EnqueueOutcome, ExecutionJob, ExecutionQueuePort, FailureDisposition, QueueCounts, QueueError,
};
#[cfg(test)]
pub use execution_router_port::MockExecutionRouterPort;
pub use execution_router_port::{ExecutionIntent, ExecutionRouterPort, RouterError};
