//! Metrics collection and Prometheus export.
//!
//! Installs the Prometheus recorder behind the `metrics` facade and provides
//! the pipeline-specific recording helpers.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Call once at startup before any metrics are recorded. Until then every
/// recording helper is a no-op.
pub fn init_metrics() -> Result<(), String> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("failed to install Prometheus recorder: {}", e))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| "metrics handle already initialized".to_string())?;

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record how long a pipeline stage took.
pub fn record_stage_latency(stage: &str, duration_secs: f64) {
    histogram!("analysis_stage_duration_seconds", "stage" => stage.to_string())
        .record(duration_secs);
}

/// Record a pipeline stage failure.
pub fn record_stage_failure(stage: &str, error_kind: &str) {
    counter!(
        "analysis_stage_failures_total",
        "stage" => stage.to_string(),
        "error_type" => error_kind.to_string()
    )
    .increment(1);
}

/// Record a finished analysis request.
pub fn record_analysis(modality: &str, outcome: &str) {
    counter!(
        "analysis_requests_total",
        "modality" => modality.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record remote provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    histogram!(
        "analysis_provider_latency_seconds",
        "provider" => provider.to_string(),
        "model" => model.to_string()
    )
    .record(duration_secs);
}

/// Record a remote provider error.
pub fn record_provider_error(provider: &str, error_kind: &str) {
    counter!(
        "analysis_provider_errors_total",
        "provider" => provider.to_string(),
        "error_type" => error_kind.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_stage_latency("classify", 0.1);
        record_stage_failure("classify", "classification_service");
        record_analysis("mri", "success");
        record_provider_latency("groq", "llama", 1.0);
        record_provider_error("groq", "rate_limited");
    }
}
