//! Todo CRUD handlers.
//!
//! Each handler is a thin translation: extract, call the store, map the
//! store outcome to a status code. Messages come from
//! [`messages`](super::messages).

use super::messages;
use crate::error::AppError;
use crate::extractors::{TodoBody, TodoIdPath};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use todo_svc_core::{StoreError, TodoItem};

/// Create a todo item.
///
/// `POST /api/v1/todo` -> 201 with the stored item, id assigned by the store.
///
/// # Errors
///
/// - 400 `Unrecognized request body or content type`: body is not a todo
/// - 400 `Invalid request body for resource creation`: body was `null`
pub async fn create_todo(
    State(state): State<AppState>,
    TodoBody(item): TodoBody,
) -> Result<(StatusCode, Json<TodoItem>), AppError> {
    let created = state.store.create(item).await.map_err(|err| match err {
        StoreError::BadInput(_) => AppError::bad_request(messages::BAD_CREATION_BODY),
        other => AppError::from(other),
    })?;

    tracing::debug!(id = created.id, "Created todo item");
    Ok((StatusCode::CREATED, Json(created)))
}

/// List every todo item.
///
/// `GET /api/v1/todo` -> 200 with a JSON array, `[]` when empty.
///
/// # Errors
///
/// Only a failing backend, as 500.
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, AppError> {
    let todos = state.store.get_all().await?;
    Ok(Json(todos))
}

/// Fetch one todo item.
///
/// `GET /api/v1/todo/{id}` -> 200 with the item.
///
/// # Errors
///
/// - 400 `Invalid ID format`
/// - 404 `TodoItem not found`
pub async fn get_todo(
    State(state): State<AppState>,
    TodoIdPath(id): TodoIdPath,
) -> Result<Json<TodoItem>, AppError> {
    let todo = state.store.get(id).await.map_err(|err| match err {
        StoreError::NotFound(_) => AppError::not_found(messages::NOT_FOUND),
        other => AppError::from(other),
    })?;

    Ok(Json(todo))
}

/// Replace a todo item.
///
/// `PUT /api/v1/todo/{id}` -> 200 with an empty body. The stored item keeps
/// the path id whatever id the body carries.
///
/// # Errors
///
/// - 400 `Invalid ID format`
/// - 400 `Unrecognized request body or content type`: body is not a todo or
///   was `null`
/// - 404 `TodoItem not found`
pub async fn update_todo(
    State(state): State<AppState>,
    TodoIdPath(id): TodoIdPath,
    TodoBody(item): TodoBody,
) -> Result<StatusCode, AppError> {
    state.store.update(id, item).await.map_err(|err| match err {
        StoreError::BadInput(_) => AppError::bad_request(messages::BAD_BODY),
        StoreError::NotFound(_) => AppError::not_found(messages::NOT_FOUND),
        other => AppError::from(other),
    })?;

    Ok(StatusCode::OK)
}

/// Delete a todo item.
///
/// `DELETE /api/v1/todo/{id}` -> 200 with an empty body, including when
/// nothing was stored under `id`.
///
/// # Errors
///
/// - 400 `Invalid ID format`: unparseable id, or the reserved id `0`
pub async fn delete_todo(
    State(state): State<AppState>,
    TodoIdPath(id): TodoIdPath,
) -> Result<StatusCode, AppError> {
    match state.store.delete(id).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(StoreError::NotFound(_)) => {
            tracing::debug!(id, "Delete of absent todo item");
            Ok(StatusCode::OK)
        }
        Err(StoreError::BadInput(_)) => Err(AppError::bad_request(messages::INVALID_ID)),
        Err(other) => Err(AppError::from(other)),
    }
}
