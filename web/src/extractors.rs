//! Request extractors for the todo routes.
//!
//! Both extractors reject with an [`AppError`] so malformed input renders the
//! same JSON error body as a store failure:
//! - [`TodoIdPath`]: the `{id}` path segment as a [`TodoId`]
//! - [`TodoBody`]: a JSON request body as `Option<TodoItem>`
//!
//! # Examples
//!
//! ```ignore
//! async fn update(
//!     State(state): State<AppState>,
//!     TodoIdPath(id): TodoIdPath,
//!     TodoBody(item): TodoBody,
//! ) -> Result<StatusCode, AppError> {
//!     state.store.update(id, item).await?;
//!     Ok(StatusCode::OK)
//! }
//! ```

use crate::error::AppError;
use crate::handlers::messages;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use todo_svc_core::{TodoId, TodoItem};

/// Todo id taken from the `{id}` path segment.
///
/// Anything that is not a non-negative integer (letters, a sign, overflow)
/// is rejected with 400 `Invalid ID format`. Zero parses; whether it is a
/// valid id is the store's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoIdPath(pub TodoId);

#[async_trait]
impl<S> FromRequestParts<S> for TodoIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request(messages::INVALID_ID))?;

        raw.parse::<TodoId>()
            .map(Self)
            .map_err(|_| AppError::bad_request(messages::INVALID_ID))
    }
}

/// JSON request body decoded as an optional [`TodoItem`].
///
/// A literal `null` body decodes to `None` and is left for the store to
/// reject. A missing or non-JSON content type, or a body that is not a todo
/// object, is rejected with 400 `Unrecognized request body or content type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoBody(pub Option<TodoItem>);

#[async_trait]
impl<S> FromRequest<S> for TodoBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(item) = Json::<Option<TodoItem>>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected request body");
                AppError::bad_request(messages::BAD_BODY)
            })?;

        Ok(Self(item))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::IntoResponse,
        routing::{get, post},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/item/:id",
                get(|TodoIdPath(id): TodoIdPath| async move { id.to_string() }),
            )
            .route(
                "/item",
                post(|TodoBody(item): TodoBody| async move {
                    item.map_or_else(|| "none".to_string(), |item| item.summary)
                        .into_response()
                }),
            )
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_id_parses() {
        let response = app()
            .oneshot(Request::get("/item/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "42");
    }

    #[tokio::test]
    async fn test_id_rejects_non_integers() {
        for path in ["/item/abc", "/item/-1", "/item/1.5", "/item/99999999999999999999"] {
            let response = app()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
            assert!(body_string(response).await.contains("Invalid ID format"));
        }
    }

    #[tokio::test]
    async fn test_body_parses_and_null_is_none() {
        let request = |body: &'static str| {
            Request::post("/item")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let response = app().oneshot(request(r#"{"summary":"milk"}"#)).await.unwrap();
        assert_eq!(body_string(response).await, "milk");

        let response = app().oneshot(request("null")).await.unwrap();
        assert_eq!(body_string(response).await, "none");
    }

    #[tokio::test]
    async fn test_body_rejections() {
        let cases = [
            (Some("application/json"), "{not json"),
            (Some("application/json"), r#"{"summary": 5}"#),
            (Some("text/plain"), r#"{"summary":"milk"}"#),
            (None, r#"{"summary":"milk"}"#),
        ];

        for (content_type, body) in cases {
            let mut builder = Request::post("/item");
            if let Some(content_type) = content_type {
                builder = builder.header(header::CONTENT_TYPE, content_type);
            }
            let response = app()
                .oneshot(builder.body(Body::from(body)).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert!(
                body_string(response)
                    .await
                    .contains("Unrecognized request body or content type")
            );
        }
    }
}
