//! HTTP handlers.
//!
//! - [`todo`]: CRUD over `/api/v1/todo`
//! - [`health`]: unauthenticated liveness and readiness probes

pub mod health;
pub mod todo;

/// Fixed client-facing error messages.
pub mod messages {
    /// Body could not be decoded as a todo item.
    pub const BAD_BODY: &str = "Unrecognized request body or content type";
    /// Body decoded but the store refused to create from it.
    pub const BAD_CREATION_BODY: &str = "Invalid request body for resource creation";
    /// Path id is not a valid todo id.
    pub const INVALID_ID: &str = "Invalid ID format";
    /// No todo item is stored under the id.
    pub const NOT_FOUND: &str = "TodoItem not found";
}
