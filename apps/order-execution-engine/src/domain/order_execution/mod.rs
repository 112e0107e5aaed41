//! Order Execution Bounded Context
//!
//! Order lifecycle from submission to the last execution attempt.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: owns amount, fill and status; every write is clamped
//! - **State Machine**: status table plus the fill-update rule
//! - **Order Updates**: the event fanned out after every state write

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{CreateOrderCommand, Order};
pub use errors::OrderError;
pub use events::{EventEnvelope, ORDER_UPDATE_EVENT, OrderUpdateEvent};
pub use repository::OrderRepository;
pub use services::{FillDecision, OrderStateMachine, PRICE_NOT_MATCHED};
pub use value_objects::{
    ExecutionDiagnostics, ExecutionResult, OrderMeta, OrderSide, OrderStatus, OrderType,
    TimeInForce,
};
