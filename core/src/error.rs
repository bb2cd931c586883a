//! Error taxonomy surfaced by todo stores.

use crate::model::TodoId;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by a [`TodoStore`](crate::TodoStore).
///
/// Both in-memory variants are expected, local outcomes. The request layer
/// recovers from them and turns them into client-facing status codes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A caller-supplied argument does not satisfy a precondition
    /// (absent item, reserved id).
    #[error("bad input: {0}")]
    BadInput(String),

    /// No item is stored under the referenced id.
    #[error("todo item {0} not found")]
    NotFound(TodoId),

    /// Failure inside a non-memory backend. [`MemoryStore`](crate::MemoryStore)
    /// never returns this.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a `BadInput` error.
    #[must_use]
    pub fn bad_input(reason: impl Into<String>) -> Self {
        Self::BadInput(reason.into())
    }

    /// Whether this is a `BadInput` error.
    #[must_use]
    pub const fn is_bad_input(&self) -> bool {
        matches!(self, Self::BadInput(_))
    }

    /// Whether this is a `NotFound` error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::bad_input("0 is not a valid id").to_string(),
            "bad input: 0 is not a valid id"
        );
        assert_eq!(StoreError::NotFound(3).to_string(), "todo item 3 not found");
    }

    #[test]
    fn test_classification() {
        assert!(StoreError::bad_input("x").is_bad_input());
        assert!(!StoreError::bad_input("x").is_not_found());
        assert!(StoreError::NotFound(1).is_not_found());
        assert!(!StoreError::Backend("down".into()).is_bad_input());
    }
}
