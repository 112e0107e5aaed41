//! Observability module for metrics.
//!
//! Prometheus series for the execution pipeline, rendered over HTTP.

mod metrics;

pub use self::metrics::{
    MetricsError, init_metrics, metrics_handle, record_execution_duration, record_fill_ratio,
    record_job_outcome, record_order, record_order_error, record_queue_latency,
    update_queue_size, update_websocket_connections,
};
