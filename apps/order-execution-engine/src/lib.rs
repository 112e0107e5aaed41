// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Order Execution Engine - Rust Core Library
//!
//! Asynchronous order execution pipeline: orders are validated, stored as
//! `pending` and queued; a bounded, rate-limited worker pool routes each one
//! to an execution venue, persists the fill and fans an `order:update` event
//! out to every connected subscriber.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `order_execution`: Order aggregate, status lifecycle, fill-update rule
//!   - `shared`: Identifiers, symbols, timestamps
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`ExecutionRouterPort`,
//!     `ExecutionQueuePort`, `EventPublisherPort`)
//!   - `use_cases`: `SubmitOrder`, `ExecuteOrder`
//!   - `services`: Worker pool, rate limiter, queue-event loop
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: Order store (in-memory)
//!   - `queue`: Execution queue with exponential backoff
//!   - `router`: Simulated DEX venue
//!   - `broadcast`: Subscriber registry
//!   - `http`: REST and WebSocket endpoints
//!   - `config`: Dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Metrics.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::order_execution::{
    aggregate::Order,
    events::OrderUpdateEvent,
    value_objects::{ExecutionResult, OrderSide, OrderStatus, OrderType, TimeInForce},
};
pub use domain::shared::{ClientId, ConnectionId, OrderId, Symbol, Timestamp};

// Application re-exports
pub use application::dto::{CreateOrderDto, SubmitOrderResponseDto};
pub use application::ports::{
    EventPublisherPort, ExecutionQueuePort, ExecutionRouterPort, NoOpEventPublisher, RouterError,
};
pub use application::services::{WorkerPool, WorkerPoolConfig};
pub use application::use_cases::{ExecuteOrderUseCase, SubmitOrderUseCase};

// Infrastructure re-exports
pub use infrastructure::broadcast::SubscriberRegistry;
pub use infrastructure::config::Container;
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::InMemoryOrderRepository;
pub use infrastructure::queue::{InMemoryExecutionQueue, RetryPolicy};
pub use infrastructure::router::{SimulatedDexRouter, SimulatedRouterConfig};
