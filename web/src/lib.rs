//! Axum HTTP layer for the todo service.
//!
//! Translates JSON-over-HTTP requests into [`TodoStore`](todo_svc_core::TodoStore)
//! calls and store errors back into status codes.
//!
//! # Request Flow
//!
//! 1. **Request logging** opens an `http_request` span with a request id
//! 2. **Basic auth** checks credentials against the injected credential store
//! 3. **Extractors** parse the `{id}` segment and JSON body
//! 4. **Handler** calls the store
//! 5. **`AppError`** maps `BadInput` to 400 and `NotFound` to 404
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use todo_svc_auth::StaticCredentialStore;
//! use todo_svc_core::MemoryStore;
//! use todo_svc_web::{build_router, AppState, HttpTimeouts};
//!
//! let state = AppState::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(StaticCredentialStore::dev()?),
//! );
//! let app = build_router(state, HttpTimeouts::default());
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use auth::{AuthenticatedUser, REALM};
pub use error::AppError;
pub use extractors::{TodoBody, TodoIdPath};
pub use middleware::{REQUEST_ID_HEADER, request_logging_layer};
pub use router::{API_PREFIX, HttpTimeouts, SERVICE_DESCRIPTION, build_router};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
