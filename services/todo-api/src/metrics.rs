//! Prometheus metrics.
//!
//! The recorder is process-global. [`install_recorder`] installs it on the
//! first call and hands back the same handle afterwards, so several
//! applications (or tests) in one process share it.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use parking_lot::Mutex;
use thiserror::Error;
use todo_svc_web::middleware::{REQUEST_DURATION_SECONDS, REQUESTS_TOTAL};

/// Gauge of items currently stored.
pub const TODOS_STORED: &str = "todo_items_stored";

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the Prometheus recorder, or return the one already installed.
///
/// # Errors
///
/// Returns error if the exporter cannot be built or another recorder owns
/// the global slot.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    let mut slot = HANDLE.lock();
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::debug!("Prometheus recorder installed");

    *slot = Some(handle.clone());
    Ok(handle)
}

fn register_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total HTTP requests served");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
    describe_gauge!(TODOS_STORED, "Todo items currently stored");
}
