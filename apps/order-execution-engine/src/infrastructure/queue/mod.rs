//! Execution queue adapters.

mod in_memory;
mod retry;

pub use in_memory::InMemoryExecutionQueue;
pub use retry::RetryPolicy;
