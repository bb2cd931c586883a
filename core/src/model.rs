//! Base data types of the todo service.

use serde::{Deserialize, Serialize};

/// Identifier of a stored [`TodoItem`]. Zero is reserved and never assigned.
pub type TodoId = u64;

/// A single task.
///
/// Every field defaults when missing from a JSON body, so `{"summary": "x"}`
/// deserializes to `{ id: 0, summary: "x", done: false }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoItem {
    /// Store-assigned identifier.
    pub id: TodoId,
    /// Free-form description of the task.
    pub summary: String,
    /// Completion flag.
    pub done: bool,
}

impl TodoItem {
    /// Create an open item with the given summary and no id.
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            id: 0,
            summary: summary.into(),
            done: false,
        }
    }

    /// Set the completion flag.
    #[must_use]
    pub const fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }
}
