//! HTTP/REST and WebSocket adapter.
//!
//! Inbound adapter exposing order submission, order lookup, health, metrics
//! and the live order-update stream.

mod controller;
mod error;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use error::HttpError;
pub use request::{CreateOrderRequest, WsQuery};
pub use response::{DependencyStatus, ErrorResponse, HealthResponse};
