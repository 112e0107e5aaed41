//! Event broadcasting to live subscribers.

mod registry;

pub use registry::{ChannelSink, SubscriberRegistry};
