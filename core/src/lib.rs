//! # todo-svc core
//!
//! Domain model and persistence for the todo service.
//!
//! ## Contents
//!
//! - [`TodoItem`]: the task resource (id, summary, completion flag)
//! - [`TodoStore`]: the persistence contract the request layer talks to
//! - [`MemoryStore`]: process-local implementation behind a readers-writer lock
//! - [`StoreError`]: the `BadInput` / `NotFound` taxonomy
//!
//! ## Example
//!
//! ```
//! use todo_svc_core::{MemoryStore, TodoItem};
//!
//! let store = MemoryStore::new();
//! let created = store.create(Some(TodoItem::new("Water the plants"))).unwrap();
//! assert_eq!(created.id, 1);
//! assert_eq!(store.get(1).unwrap(), created);
//! ```

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreStats};
pub use model::{TodoId, TodoItem};
pub use store::{StoreFuture, TodoStore};
