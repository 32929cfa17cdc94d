//! Observability Metrics
//!
//! Prometheus recorder and `/metrics` endpoint. Dialogue-level metrics are
//! recorded by the agent crate through the same `metrics` facade.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::ServerError;

/// Global Prometheus handle
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics recorder
///
/// Must be called once at startup before recording any metrics.
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(format!("Failed to install Prometheus recorder: {}", e)))?;

    register_default_metrics();

    METRICS_HANDLE.get_or_init(|| handle.clone());
    Ok(handle)
}

/// Get the global metrics handle
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

fn register_default_metrics() {
    gauge!("voice_intake_calls_active").set(0.0);
    counter!("voice_intake_calls_started_total").absolute(0);
    counter!("voice_intake_calls_rejected_total").absolute(0);
    counter!("voice_intake_protocol_errors_total").absolute(0);
}

pub fn record_call_started() {
    counter!("voice_intake_calls_started_total").increment(1);
}

pub fn record_call_rejected() {
    counter!("voice_intake_calls_rejected_total").increment(1);
}

pub fn record_active_calls(count: usize) {
    gauge!("voice_intake_calls_active").set(count as f64);
}

pub fn record_protocol_error() {
    counter!("voice_intake_protocol_errors_total").increment(1);
}

/// Prometheus scrape handler
pub async fn metrics_handler() -> impl IntoResponse {
    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}
