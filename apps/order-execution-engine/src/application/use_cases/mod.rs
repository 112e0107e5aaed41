//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod execute_order;
mod submit_order;

pub use execute_order::{ExecuteOrderUseCase, ExecutionError};
pub use submit_order::{SubmitOrderError, SubmitOrderUseCase};
