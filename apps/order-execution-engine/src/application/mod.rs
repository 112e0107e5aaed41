//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for the router, the queue and subscriber fan-out
//! - **Use Cases**: Order submission and single-attempt execution
//! - **Services**: The worker pool and its rate limiter
//! - **DTOs**: Data transfer objects for API boundaries

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use use_cases::*;
