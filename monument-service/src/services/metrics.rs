//! Prometheus exposition for the relay.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global recorder. Call once from `main`; a second call fails.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::InternalError(anyhow::anyhow!("metrics handle already initialized"))
    })
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count one identification attempt by outcome (`parsed`, `fallback`, or an
/// error kind).
pub fn record_identification(outcome: &'static str) {
    metrics::counter!("monument_identifications_total", "outcome" => outcome).increment(1);
}

/// Count one upstream call by HTTP status (`0` for transport failures).
pub fn record_upstream_call(status: u16) {
    metrics::counter!("monument_upstream_calls_total", "status" => status.to_string())
        .increment(1);
}
