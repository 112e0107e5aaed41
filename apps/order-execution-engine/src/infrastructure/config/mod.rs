//! Component wiring.

mod container;

pub use container::Container;
