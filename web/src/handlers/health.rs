//! Health check endpoints.
//!
//! Served on the API listener without basic auth so load balancers can
//! check the service.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Liveness check.
///
/// Does not touch the store.
///
/// ```text
/// GET /health
/// {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Whether the store answered.
    pub ready: bool,
    /// Items currently stored, when the store answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todos: Option<usize>,
}

/// Readiness check.
///
/// 200 when the store answers a listing, 503 otherwise.
///
/// ```text
/// GET /ready
/// {"ready":true,"todos":3}
/// ```
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    match state.store.get_all().await {
        Ok(todos) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                ready: true,
                todos: Some(todos.len()),
            }),
        ),
        Err(error) => {
            tracing::warn!(%error, "Store not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    ready: false,
                    todos: None,
                }),
            )
        }
    }
}
