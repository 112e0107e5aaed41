//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Order updates fanned out to subscribers
//! - **Domain Services**: The order state machine
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`order_execution`]: Order lifecycle, fill-update rule and update events
//! - [`shared`]: Identifiers, symbols and timestamps

pub mod order_execution;
pub mod shared;
