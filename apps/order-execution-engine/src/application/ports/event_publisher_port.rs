//! Event Publisher Port (Driven Port)
//!
//! Interface for fanning out order updates to connected subscribers.

use crate::domain::order_execution::OrderUpdateEvent;
use crate::domain::shared::ConnectionId;

/// Subscriber delivery error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    /// The subscriber's connection is gone.
    #[error("Subscriber {connection_id} disconnected")]
    Disconnected {
        /// Connection that could not be reached.
        connection_id: ConnectionId,
    },

    /// The subscriber's buffer is full. The connection stays registered.
    #[error("Subscriber {connection_id} buffer full")]
    Lagging {
        /// Connection that is not keeping up.
        connection_id: ConnectionId,
    },

    /// Serialization error.
    #[error("Event serialization error: {message}")]
    Serialization {
        /// Error details.
        message: String,
    },
}

/// One outbound channel to a subscriber.
///
/// `send` must not block; a failure is reported, never retried.
pub trait SubscriberSink: Send + Sync {
    /// Deliver one serialized message.
    fn send(&self, message: &str) -> Result<(), BroadcastError>;
}

/// Port for publishing order updates.
pub trait EventPublisherPort: Send + Sync {
    /// Publish an order update to every subscriber.
    ///
    /// Best effort: delivery failures are absorbed. Returns the number of
    /// subscribers that accepted the message.
    fn publish(&self, update: &OrderUpdateEvent) -> usize;
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl EventPublisherPort for NoOpEventPublisher {
    fn publish(&self, _update: &OrderUpdateEvent) -> usize {
        0
    }
}
