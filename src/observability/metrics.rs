//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define server metrics (connections, validations, jobs, workers)
//! - Expose Prometheus-compatible metrics endpoint when enabled
//!
//! # Metrics
//! - `intserver_connections_active` (gauge): current connection count
//! - `intserver_expressions_checked_total` (counter): by `valid`
//! - `intserver_jobs_total` (counter): integration jobs by `status`
//! - `intserver_workers_spawned_total` (counter): workers admitted
//! - `intserver_worker_duration_seconds` (histogram): per-worker compute time
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests and
//!   the client pay nothing
//! - Exporter is opt-in through `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_connection_opened() {
    ::metrics::gauge!("intserver_connections_active").increment(1.0);
}

pub fn record_connection_closed() {
    ::metrics::gauge!("intserver_connections_active").decrement(1.0);
}

pub fn record_expression_checked(valid: bool) {
    let valid = if valid { "true" } else { "false" };
    ::metrics::counter!("intserver_expressions_checked_total", "valid" => valid).increment(1);
}

pub fn record_job(completed: bool) {
    let status = if completed { "completed" } else { "rejected" };
    ::metrics::counter!("intserver_jobs_total", "status" => status).increment(1);
}

pub fn record_worker_spawned() {
    ::metrics::counter!("intserver_workers_spawned_total").increment(1);
}

pub fn record_worker_duration(elapsed: Duration) {
    ::metrics::histogram!("intserver_worker_duration_seconds").record(elapsed.as_secs_f64());
}
