//! Persistence contract between the request layer and a backing store.
//!
//! # Design
//!
//! The trait carries exactly the five operations the HTTP surface needs.
//! Methods return boxed futures instead of using `async fn` so the trait stays
//! dyn-compatible: handlers hold an `Arc<dyn TodoStore>` and a durable backend
//! can replace [`MemoryStore`](crate::MemoryStore) without touching them.

use crate::error::Result;
use crate::model::{TodoId, TodoItem};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`TodoStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage for [`TodoItem`]s keyed by a store-assigned [`TodoId`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and every operation must appear
/// atomic with respect to every other one.
pub trait TodoStore: Send + Sync {
    /// Store a new item under a freshly allocated id and return it.
    ///
    /// Any id already set on `item` is overwritten.
    ///
    /// # Errors
    ///
    /// - `BadInput`: `item` is `None`
    fn create(&self, item: Option<TodoItem>) -> StoreFuture<'_, TodoItem>;

    /// Snapshot of every stored item, in no particular order.
    ///
    /// An empty store yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// The in-memory store never fails; other backends may return `Backend`.
    fn get_all(&self) -> StoreFuture<'_, Vec<TodoItem>>;

    /// Fetch a single item.
    ///
    /// # Errors
    ///
    /// - `NotFound`: nothing is stored under `id`
    fn get(&self, id: TodoId) -> StoreFuture<'_, TodoItem>;

    /// Replace the item stored under `id` with `new_state`, keeping `id`.
    ///
    /// This is a full replace, not a merge.
    ///
    /// # Errors
    ///
    /// - `BadInput`: `new_state` is `None`
    /// - `NotFound`: nothing is stored under `id`
    fn update(&self, id: TodoId, new_state: Option<TodoItem>) -> StoreFuture<'_, ()>;

    /// Remove the item stored under `id`. The id is never handed out again.
    ///
    /// # Errors
    ///
    /// - `BadInput`: `id` is the reserved value `0`
    /// - `NotFound`: nothing is stored under `id`
    fn delete(&self, id: TodoId) -> StoreFuture<'_, ()>;
}
