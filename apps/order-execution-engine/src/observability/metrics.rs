//! Prometheus metrics for the order execution pipeline.
//!
//! The recorder is installed once per process and rendered by the
//! `GET /metrics` handler. Recording functions are safe to call before
//! installation; the `metrics` facade drops samples until a recorder exists.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use parking_lot::Mutex;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Latency buckets (seconds) for execution and queue wait histograms.
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Buckets for the executed/requested ratio.
const RATIO_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 0.75, 0.9, 0.95, 0.99, 1.0];

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Install the Prometheus recorder, or return the existing handle.
///
/// # Errors
///
/// Returns an error if the bucket layout is rejected or another recorder is
/// already installed globally.
pub fn init_metrics() -> Result<PrometheusHandle, MetricsError> {
    let _guard = INIT_LOCK.lock();
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .set_buckets_for_metric(
            Matcher::Full("order_fill_ratio".to_string()),
            RATIO_BUCKETS,
        )
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    register_metrics();
    tracing::info!("Prometheus metrics recorder installed");

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "orders_total",
        "Orders processed, by type, side and resulting status"
    );
    describe_histogram!(
        "order_execution_duration_seconds",
        "Time spent in the execution router"
    );
    describe_histogram!(
        "order_fill_ratio",
        "Executed amount divided by requested amount"
    );
    describe_gauge!("order_queue_size", "Jobs waiting, delayed or active");
    describe_histogram!(
        "order_queue_latency_seconds",
        "Time between enqueue and the start of an attempt"
    );
    describe_gauge!(
        "websocket_connections_current",
        "Connected WebSocket subscribers"
    );
    describe_counter!(
        "order_errors_total",
        "Failed execution attempts, by order type and failing operation"
    );
    describe_counter!("order_jobs_total", "Queue job outcomes");
}

// ============================================================================
// Order Execution Metrics
// ============================================================================

/// Record an order reaching a post-execution status.
pub fn record_order(order_type: &str, side: &str, status: &str) {
    counter!(
        "orders_total",
        "type" => order_type.to_string(),
        "side" => side.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record time spent in the router.
pub fn record_execution_duration(order_type: &str, side: &str, elapsed: Duration) {
    histogram!(
        "order_execution_duration_seconds",
        "type" => order_type.to_string(),
        "side" => side.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Record executed/requested ratio of an attempt.
pub fn record_fill_ratio(order_type: &str, side: &str, ratio: f64) {
    histogram!(
        "order_fill_ratio",
        "type" => order_type.to_string(),
        "side" => side.to_string()
    )
    .record(ratio);
}

/// Record a failed attempt.
///
/// * `operation` - `"execute"` for router failures, `"store"` for persistence
pub fn record_order_error(order_type: &str, operation: &str) {
    counter!(
        "order_errors_total",
        "type" => order_type.to_string(),
        "operation" => operation.to_string()
    )
    .increment(1);
}

// ============================================================================
// Queue Metrics
// ============================================================================

/// Record how long a job waited before starting.
pub fn record_queue_latency(waited: Duration) {
    histogram!("order_queue_latency_seconds").record(waited.as_secs_f64());
}

/// Update the queue depth gauge.
pub fn update_queue_size(size: usize) {
    gauge!("order_queue_size").set(size as f64);
}

/// Record a job outcome (`completed`, `retrying`, `failed`).
pub fn record_job_outcome(outcome: &str) {
    counter!("order_jobs_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Subscriber Metrics
// ============================================================================

/// Update the connected subscriber gauge.
pub fn update_websocket_connections(count: usize) {
    gauge!("websocket_connections_current").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_order("market", "buy", "filled");
        record_execution_duration("market", "buy", Duration::from_millis(120));
        record_fill_ratio("limit", "sell", 0.97);
        record_order_error("market", "execute");
        record_queue_latency(Duration::from_millis(3));
        update_queue_size(4);
        record_job_outcome("completed");
        update_websocket_connections(2);
    }

    #[test]
    fn init_metrics_is_idempotent() {
        init_metrics().unwrap();
        let handle = init_metrics().unwrap();

        record_job_outcome("completed");

        assert!(handle.render().contains("order_jobs_total"));
        assert!(metrics_handle().is_some());
    }
}
