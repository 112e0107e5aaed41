//! Order Execution Engine Binary
//!
//! Starts the HTTP/WebSocket API and the execution worker pool.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-execution-engine
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG_PATH`: YAML config file (default: config.yaml, optional)
//! - `PORT`: HTTP server port (default: 3000)
//! - `QUEUE_CONCURRENCY`: Worker count (default: 10)
//! - `RATE_LIMIT_MAX`: Job starts per window (default: 100)
//! - `RATE_LIMIT_DURATION_MS`: Rate-limit window (default: 60000)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use order_execution_engine::config::{Config, load_config};
use order_execution_engine::infrastructure::broadcast::SubscriberRegistry;
use order_execution_engine::infrastructure::config::Container;
use order_execution_engine::infrastructure::http::create_router;
use order_execution_engine::infrastructure::persistence::InMemoryOrderRepository;
use order_execution_engine::infrastructure::queue::InMemoryExecutionQueue;
use order_execution_engine::infrastructure::router::SimulatedDexRouter;
use order_execution_engine::observability::init_metrics;
use tokio::net::TcpListener;
use tokio::signal;

/// Concrete container used by the binary.
type EngineContainer =
    Container<InMemoryOrderRepository, InMemoryExecutionQueue, SimulatedDexRouter>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();
    init_tracing();

    tracing::info!("Starting Order Execution Engine");

    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = load_config(config_path.as_deref())?;
    log_config(&config);

    init_metrics()?;

    let container = create_container(&config);
    let pool = container.worker_pool(config.worker_pool());
    pool.start()?;

    let app = create_router(container.app_state(env!("CARGO_PKG_VERSION")));
    let addr: SocketAddr = config
        .server
        .socket_addr()
        .ok_or("server.bind_address is not an IP address")?;

    tracing::info!(%addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /metrics");
    tracing::info!("  POST /orders");
    tracing::info!("  GET  /orders/{{id}}");
    tracing::info!("  GET  /ws?clientId=");

    let listener = TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // In-flight jobs finish before the pool reports stopped.
    pool.stop().await;

    served?;
    tracing::info!("Order execution engine stopped");
    Ok(())
}

/// Build the store, queue, router and subscriber registry.
fn create_container(config: &Config) -> EngineContainer {
    Container::new(
        Arc::new(InMemoryOrderRepository::new()),
        Arc::new(InMemoryExecutionQueue::new(config.queue.retry_policy())),
        Arc::new(SimulatedDexRouter::new(config.router.simulated())),
        Arc::new(SubscriberRegistry::with_sink_capacity(
            config.broadcast.subscriber_buffer,
        )),
    )
}

/// Log the loaded configuration.
fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        concurrency = config.queue.concurrency,
        rate_limit_max = config.queue.rate_limit_max,
        rate_limit_duration_ms = config.queue.rate_limit_duration_ms,
        max_attempts = config.queue.max_attempts,
        backoff_base_ms = config.queue.backoff_base_ms,
        "Configuration loaded"
    );
}

/// Initialize the tracing subscriber with environment filter.
///
/// Uses a static directive string that is a compile-time constant guaranteed to parse.
#[allow(clippy::expect_used)]
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "order_execution_engine=info"
                    .parse()
                    .expect("static directive 'order_execution_engine=info' is valid"),
            ),
        )
        .init();
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
