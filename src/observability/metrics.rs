//! Prometheus metrics for the portal.
//!
//! Provides counters for:
//! - Gate decisions by zone and outcome
//! - Identity provider calls
//! - Profile lookups made by the gate
//! - API errors returned to clients

#[cfg(feature = "prometheus")]
use std::sync::OnceLock;

#[cfg(feature = "prometheus")]
use metrics::counter;
#[cfg(feature = "prometheus")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Global Prometheus handle for the metrics endpoint.
#[cfg(feature = "prometheus")]
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics system with the given configuration.
#[cfg(feature = "prometheus")]
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(MetricsError::Install)?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::Setup("Metrics already initialized".to_string()))?;

    Ok(())
}

/// Initialize the metrics system (no-op without prometheus feature).
#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(_config: &MetricsConfig) -> Result<(), MetricsError> {
    Ok(())
}

/// Get the Prometheus handle for rendering metrics.
#[cfg(feature = "prometheus")]
pub fn get_prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ─────────────────────────────────────────────────────────────────────────────
// Metric Recording Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Record the outcome of the session gate for one request.
pub fn record_gate_decision(zone: &str, outcome: &str) {
    #[cfg(feature = "prometheus")]
    {
        counter!(
            "gate_decisions_total",
            "zone" => zone.to_string(),
            "outcome" => outcome.to_string()
        )
        .increment(1);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (zone, outcome);
    }
}

/// Record a call to the identity provider.
///
/// `status` is "success", "rejected", "unavailable" or "invalid_response".
pub fn record_identity_request(operation: &str, status: &str) {
    #[cfg(feature = "prometheus")]
    {
        counter!(
            "identity_requests_total",
            "operation" => operation.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (operation, status);
    }
}

/// Record a profile lookup made by the gate ("found", "absent" or "error").
pub fn record_profile_lookup(result: &str) {
    #[cfg(feature = "prometheus")]
    {
        counter!("gate_profile_lookups_total", "result" => result.to_string()).increment(1);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = result;
    }
}

/// Record an error response returned by an API handler.
pub fn record_api_error(error_type: &str, code: &str) {
    #[cfg(feature = "prometheus")]
    {
        counter!(
            "api_errors_total",
            "error_type" => error_type.to_string(),
            "code" => code.to_string()
        )
        .increment(1);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (error_type, code);
    }
}

/// Metrics initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to set up metrics: {0}")]
    Setup(String),

    #[cfg(feature = "prometheus")]
    #[error("Failed to install metrics recorder: {0}")]
    Install(#[from] metrics_exporter_prometheus::BuildError),
}
