//! Order Execution Value Objects
//!
//! Immutable types for order management.

mod execution_result;
mod order_meta;
mod order_side;
mod order_status;
mod order_type;
mod time_in_force;

pub use execution_result::{ExecutionDiagnostics, ExecutionResult};
pub use order_meta::OrderMeta;
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use time_in_force::TimeInForce;
