//! Router assembly.
//!
//! ```text
//! GET    /health
//! GET    /ready
//! POST   /api/v1/todo        (basic auth)
//! GET    /api/v1/todo        (basic auth)
//! GET    /api/v1/todo/:id    (basic auth)
//! PUT    /api/v1/todo/:id    (basic auth)
//! DELETE /api/v1/todo/:id    (basic auth)
//! ```
//!
//! Layers, outermost first: panic recovery, request logging, `Server`
//! header, request body read timeout, handler timeout. Basic auth is a route
//! layer on the todo routes only, so unknown paths still 404 unauthenticated.

use crate::auth::require_basic_auth;
use crate::handlers::{health, todo};
use crate::middleware::request_logging_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    middleware,
    routing::get,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    set_header::SetResponseHeaderLayer,
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
};

/// Version prefix all todo routes are nested under.
pub const API_PREFIX: &str = "/api/v1";

/// Value of the `Server` response header.
pub const SERVICE_DESCRIPTION: &str = "Todo Item API";

/// Per-request time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Limit on reading the request body.
    pub read: Duration,
    /// Limit on producing the response. Expiry answers 408.
    pub write: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(5),
            write: Duration::from_secs(10),
        }
    }
}

/// Build the API router with every layer installed.
pub fn build_router(state: AppState, timeouts: HttpTimeouts) -> Router {
    let todos = Router::new()
        .route("/todo", get(todo::list_todos).post(todo::create_todo))
        .route("/todo/", get(todo::list_todos).post(todo::create_todo))
        .route(
            "/todo/:id",
            get(todo::get_todo)
                .put(todo::update_todo)
                .delete(todo::delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest(API_PREFIX, todos)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::new())
                .layer(request_logging_layer())
                .layer(SetResponseHeaderLayer::overriding(
                    header::SERVER,
                    HeaderValue::from_static(SERVICE_DESCRIPTION),
                ))
                .layer(RequestBodyTimeoutLayer::new(timeouts.read))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    timeouts.write,
                )),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use todo_svc_auth::DenyAllCredentialStore;
    use todo_svc_core::MemoryStore;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(DenyAllCredentialStore));
        build_router(state, HttpTimeouts::default())
    }

    #[tokio::test]
    async fn test_health_is_unauthenticated() {
        for path in ["/health", "/ready"] {
            let response = app()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_server_header() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::SERVER).unwrap(),
            SERVICE_DESCRIPTION
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
