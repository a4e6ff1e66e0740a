//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): dispatched requests by method, status
//! - `http_request_duration_seconds` (histogram): time from accept to response written
//! - `http_active_connections` (gauge): current connection count
//! - `http_rejected_requests_total` (counter): 400s written by the connection handler, by reason

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, started: Instant) {
    ::metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("http_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_rejected(reason: &'static str) {
    ::metrics::counter!("http_rejected_requests_total", "reason" => reason).increment(1);
}

pub fn connection_opened() {
    ::metrics::gauge!("http_active_connections").increment(1.0);
}

pub fn connection_closed() {
    ::metrics::gauge!("http_active_connections").decrement(1.0);
}
