//! Event broadcasting configuration.

use serde::{Deserialize, Serialize};

/// Broadcast configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Capacity of the queue-event channel between workers and the
    /// queue-event task.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    /// Messages buffered per subscriber connection. Updates for a subscriber
    /// whose buffer is full are dropped for that subscriber only.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

pub(crate) const fn default_event_channel_capacity() -> usize {
    1024
}

pub(crate) const fn default_subscriber_buffer() -> usize {
    256
}
