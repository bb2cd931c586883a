//! Debug listener routes.
//!
//! Served without authentication on the debug bind address, separate from
//! the API:
//!
//! ```text
//! GET /debug/vars   {"build","version","cpus","todos","next_id"}
//! GET /metrics      Prometheus text format
//! GET /health       liveness
//! ```

use crate::config::BUILD;
use crate::metrics::TODOS_STORED;
use axum::{Json, Router, extract::State, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use todo_svc_core::{MemoryStore, TodoId};
use todo_svc_web::{handlers::health::health_check, request_logging_layer};

/// State behind the debug routes.
#[derive(Clone)]
pub struct DebugState {
    store: Arc<MemoryStore>,
    metrics: PrometheusHandle,
}

/// Process and store variables.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DebugVars {
    /// Build tag.
    pub build: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Available parallelism.
    pub cpus: usize,
    /// Items currently stored.
    pub todos: usize,
    /// Id the next created item will get.
    pub next_id: TodoId,
}

/// Build the debug router.
pub fn debug_router(store: Arc<MemoryStore>, metrics: PrometheusHandle) -> Router {
    Router::new()
        .route("/debug/vars", get(debug_vars))
        .route("/metrics", get(render_metrics))
        .route("/health", get(health_check))
        .layer(request_logging_layer())
        .with_state(DebugState { store, metrics })
}

/// Number of CPUs the process may use, 1 if unknown.
#[must_use]
pub fn available_cpus() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

#[allow(clippy::unused_async)]
async fn debug_vars(State(state): State<DebugState>) -> Json<DebugVars> {
    let stats = state.store.stats();
    Json(DebugVars {
        build: BUILD,
        version: env!("CARGO_PKG_VERSION"),
        cpus: available_cpus(),
        todos: stats.len,
        next_id: stats.next_id,
    })
}

#[allow(clippy::unused_async, clippy::cast_precision_loss)]
async fn render_metrics(State(state): State<DebugState>) -> String {
    metrics::gauge!(TODOS_STORED).set(state.store.len() as f64);
    state.metrics.render()
}
