//! Infrastructure Layer
//!
//! This module contains all adapters (implementations) for the ports defined
//! in the application layer. Following hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**: Implement ports for external systems
//!   - `persistence/`: Order store
//!   - `queue/`: Execution queue with retry/backoff
//!   - `router/`: Execution venue (simulated DEX)
//!   - `broadcast/`: Subscriber registry for order updates
//!
//! - **Driver Adapters (Inbound)**: Expose application to external world
//!   - `http/`: REST and WebSocket endpoints
//!
//! - **Wiring**
//!   - `config/`: Dependency injection container

pub mod broadcast;
pub mod config;
pub mod http;
pub mod persistence;
pub mod queue;
pub mod router;
