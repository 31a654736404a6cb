//! Metrics collection and exposition.
//!
//! # Metrics
//! - `responder_responses_total` (counter): responses built, by status
//! - `responder_errors_total` (counter): failed builds, by error kind
//! - `cors_requests_total` (counter): CORS decisions, by outcome
//! - `output_buffer_captured_bytes_total` (counter): bytes merged into bodies
//! - `content_type_injected_total` (counter): headers filled in, by header
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use axum::http::StatusCode;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_response(status: StatusCode) {
    counter!("responder_responses_total", "status" => status.as_str().to_string()).increment(1);
}

pub fn record_responder_error(kind: &'static str) {
    counter!("responder_errors_total", "kind" => kind).increment(1);
}

pub fn record_cors(outcome: &'static str) {
    counter!("cors_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_captured_output(bytes: usize) {
    counter!("output_buffer_captured_bytes_total").increment(bytes as u64);
}

pub fn record_injected_header(header: &'static str) {
    counter!("content_type_injected_total", "header" => header).increment(1);
}
