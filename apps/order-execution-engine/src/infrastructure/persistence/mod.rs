//! Persistence Adapters
//!
//! Implementations of the order store.

pub mod in_memory;

pub use in_memory::InMemoryOrderRepository;
