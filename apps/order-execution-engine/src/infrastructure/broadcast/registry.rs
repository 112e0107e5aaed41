//! Subscriber registry.
//!
//! Keeps the set of live connections and fans every order update out to all
//! of them. Each message is serialized once. Delivery to one subscriber never
//! depends on another: a failed send is logged and skipped. A subscriber whose
//! buffer is full misses the message but stays registered.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::ports::{BroadcastError, EventPublisherPort, SubscriberSink};
use crate::domain::order_execution::{EventEnvelope, ORDER_UPDATE_EVENT, OrderUpdateEvent};
use crate::domain::shared::ConnectionId;
use crate::observability::update_websocket_connections;

/// Per-connection buffer used when none is configured.
pub const DEFAULT_SINK_CAPACITY: usize = 256;

/// Registry of connected subscribers.
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<ConnectionId, Arc<dyn SubscriberSink>>>,
    sink_capacity: usize,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::with_sink_capacity(DEFAULT_SINK_CAPACITY)
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("connections", &self.connection_count())
            .field("sink_capacity", &self.sink_capacity)
            .finish()
    }
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry whose connections buffer up to `capacity`
    /// messages each. A capacity of zero is raised to one.
    #[must_use]
    pub fn with_sink_capacity(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            sink_capacity: capacity.max(1),
        }
    }

    /// Buffer size for new connection sinks.
    #[must_use]
    pub const fn sink_capacity(&self) -> usize {
        self.sink_capacity
    }

    /// Register a connection. Replaces any sink already under the same ID.
    pub fn subscribe(&self, connection_id: ConnectionId, sink: Arc<dyn SubscriberSink>) {
        let count = {
            let mut subscribers = self.subscribers.write();
            subscribers.insert(connection_id.clone(), sink);
            subscribers.len()
        };
        update_websocket_connections(count);
        tracing::debug!(%connection_id, connections = count, "Subscriber connected");
    }

    /// Remove a connection. Unknown IDs are ignored.
    pub fn unsubscribe(&self, connection_id: &ConnectionId) {
        let (removed, count) = {
            let mut subscribers = self.subscribers.write();
            let removed = subscribers.remove(connection_id).is_some();
            (removed, subscribers.len())
        };
        if removed {
            update_websocket_connections(count);
            tracing::debug!(%connection_id, connections = count, "Subscriber disconnected");
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Send `{"event": event, "payload": payload}` to every subscriber.
    ///
    /// Returns the number of subscribers that accepted the message.
    pub fn broadcast<T: Serialize>(&self, event: &str, payload: T) -> Result<usize, BroadcastError> {
        let envelope = EventEnvelope {
            event: event.to_string(),
            payload,
        };
        let message =
            serde_json::to_string(&envelope).map_err(|e| BroadcastError::Serialization {
                message: e.to_string(),
            })?;

        // Snapshot so sends happen without holding the lock.
        let targets: Vec<(ConnectionId, Arc<dyn SubscriberSink>)> = self
            .subscribers
            .read()
            .iter()
            .map(|(id, sink)| (id.clone(), Arc::clone(sink)))
            .collect();

        let mut delivered = 0;
        for (connection_id, sink) in targets {
            match sink.send(&message) {
                Ok(()) => delivered += 1,
                Err(e @ BroadcastError::Lagging { .. }) => {
                    tracing::warn!(%connection_id, error = %e, event, "Subscriber lagging, event dropped");
                }
                Err(e) => {
                    tracing::warn!(%connection_id, error = %e, event, "Failed to deliver event");
                }
            }
        }

        Ok(delivered)
    }
}

impl EventPublisherPort for SubscriberRegistry {
    fn publish(&self, update: &OrderUpdateEvent) -> usize {
        match self.broadcast(ORDER_UPDATE_EVENT, update) {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::error!(order_id = %update.id, error = %e, "Failed to publish order update");
                0
            }
        }
    }
}

/// Sink backed by a bounded channel drained by a connection task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    connection_id: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl ChannelSink {
    /// Create a sink buffering up to `capacity` messages and the receiver
    /// its connection task drains.
    #[must_use]
    pub fn channel(connection_id: ConnectionId, capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { connection_id, tx }, rx)
    }
}

impl SubscriberSink for ChannelSink {
    fn send(&self, message: &str) -> Result<(), BroadcastError> {
        let connection_id = || self.connection_id.clone();
        self.tx.try_send(message.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => BroadcastError::Lagging {
                connection_id: connection_id(),
            },
            TrySendError::Closed(_) => BroadcastError::Disconnected {
                connection_id: connection_id(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::value_objects::OrderStatus;
    use crate::domain::shared::OrderId;
    use serde_json::{Value, json};

    fn update() -> OrderUpdateEvent {
        OrderUpdateEvent::with_reason(OrderId::new("ord-1"), OrderStatus::Pending, "Price not matched")
    }

    #[test]
    fn failing_subscriber_does_not_block_others() {
        let registry = SubscriberRegistry::new();
        let (first, mut first_rx) = ChannelSink::channel(ConnectionId::new("a"), 8);
        let (second, second_rx) = ChannelSink::channel(ConnectionId::new("b"), 8);
        let (third, mut third_rx) = ChannelSink::channel(ConnectionId::new("c"), 8);
        drop(second_rx);

        registry.subscribe(ConnectionId::new("a"), Arc::new(first));
        registry.subscribe(ConnectionId::new("b"), Arc::new(second));
        registry.subscribe(ConnectionId::new("c"), Arc::new(third));

        assert_eq!(registry.publish(&update()), 2);

        let expected = json!({
            "event": "order:update",
            "payload": {"id": "ord-1", "status": "pending", "reason": "Price not matched"}
        });
        let first_msg: Value = serde_json::from_str(&first_rx.try_recv().unwrap()).unwrap();
        let third_msg: Value = serde_json::from_str(&third_rx.try_recv().unwrap()).unwrap();
        assert_eq!(first_msg, expected);
        assert_eq!(third_msg, expected);
    }

    #[test]
    fn full_subscriber_does_not_block_others() {
        let registry = SubscriberRegistry::new();
        let (slow, mut slow_rx) = ChannelSink::channel(ConnectionId::new("slow"), 1);
        let (fast, mut fast_rx) = ChannelSink::channel(ConnectionId::new("fast"), 8);
        registry.subscribe(ConnectionId::new("slow"), Arc::new(slow));
        registry.subscribe(ConnectionId::new("fast"), Arc::new(fast));

        assert_eq!(registry.publish(&update()), 2);
        assert_eq!(registry.publish(&update()), 1);
        assert_eq!(registry.publish(&update()), 1);

        assert_eq!(registry.connection_count(), 2);
        let mut fast_received = 0;
        while fast_rx.try_recv().is_ok() {
            fast_received += 1;
        }
        assert_eq!(fast_received, 3);

        assert!(slow_rx.try_recv().is_ok());
        assert!(slow_rx.try_recv().is_err());
        assert_eq!(registry.publish(&update()), 2);
        assert!(slow_rx.try_recv().is_ok());
    }

    #[test]
    fn full_sink_reports_lagging() {
        let (sink, _rx) = ChannelSink::channel(ConnectionId::new("a"), 1);
        assert!(sink.send("one").is_ok());
        assert_eq!(
            sink.send("two"),
            Err(BroadcastError::Lagging {
                connection_id: ConnectionId::new("a")
            })
        );
    }

    #[test]
    fn sink_capacity_is_at_least_one() {
        assert_eq!(SubscriberRegistry::with_sink_capacity(0).sink_capacity(), 1);
        assert_eq!(SubscriberRegistry::new().sink_capacity(), DEFAULT_SINK_CAPACITY);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let registry = SubscriberRegistry::new();
        assert_eq!(registry.publish(&update()), 0);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (sink, _rx) = ChannelSink::channel(ConnectionId::new("a"), 8);
        registry.subscribe(ConnectionId::new("a"), Arc::new(sink));
        assert_eq!(registry.connection_count(), 1);

        registry.unsubscribe(&ConnectionId::new("a"));
        registry.unsubscribe(&ConnectionId::new("a"));
        registry.unsubscribe(&ConnectionId::new("never-seen"));
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn unsubscribed_connection_receives_nothing() {
        let registry = SubscriberRegistry::new();
        let (sink, mut rx) = ChannelSink::channel(ConnectionId::new("a"), 8);
        registry.subscribe(ConnectionId::new("a"), Arc::new(sink));
        registry.unsubscribe(&ConnectionId::new("a"));

        registry.publish(&update());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn broadcast_arbitrary_event() {
        let registry = SubscriberRegistry::new();
        let (sink, mut rx) = ChannelSink::channel(ConnectionId::new("a"), 8);
        registry.subscribe(ConnectionId::new("a"), Arc::new(sink));

        let delivered = registry
            .broadcast("system:notice", json!({"message": "hello"}))
            .unwrap();

        assert_eq!(delivered, 1);
        let msg: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(msg["event"], "system:notice");
        assert_eq!(msg["payload"]["message"], "hello");
    }
}
