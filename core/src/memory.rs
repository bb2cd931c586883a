//! In-memory [`TodoStore`] implementation.
//!
//! The id map and the next-id counter share one `parking_lot::RwLock`:
//! `create`, `update` and `delete` take it exclusively, `get` and `get_all`
//! take it shared. No operation awaits or performs IO while the lock is held.

use crate::error::{Result, StoreError};
use crate::model::{TodoId, TodoItem};
use crate::store::{StoreFuture, TodoStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future;

/// State guarded by the store lock.
#[derive(Debug)]
struct Inner {
    data: HashMap<TodoId, TodoItem>,
    /// Id handed to the next created item. Only ever increases.
    next_id: TodoId,
}

/// Item count and id counter read together under one lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored items.
    pub len: usize,
    /// The id the next successful `create` will assign.
    pub next_id: TodoId,
}

/// Process-local todo store.
///
/// Construct one per process (or per test) and share it behind an `Arc`.
/// Nothing survives a restart.
///
/// # Example
///
/// ```
/// use todo_svc_core::{MemoryStore, StoreError, TodoItem};
///
/// let store = MemoryStore::new();
/// let first = store.create(Some(TodoItem::new("first"))).unwrap();
/// store.delete(first.id).unwrap();
///
/// // Deleted ids are retired.
/// let second = store.create(Some(TodoItem::new("second"))).unwrap();
/// assert_eq!(second.id, 2);
/// assert_eq!(store.get(1), Err(StoreError::NotFound(1)));
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store whose first allocated id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                data: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Store `item` under the next unused id and return the stored copy.
    ///
    /// # Errors
    ///
    /// `BadInput` if `item` is `None`.
    pub fn create(&self, item: Option<TodoItem>) -> Result<TodoItem> {
        let mut item = item.ok_or_else(|| StoreError::bad_input("nil item passed to create"))?;

        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;

        item.id = id;
        inner.data.insert(id, item.clone());
        drop(inner);

        tracing::debug!(id, "todo item created");
        Ok(item)
    }

    /// Snapshot of all stored items in unspecified order.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` mirrors [`TodoStore::get_all`].
    pub fn get_all(&self) -> Result<Vec<TodoItem>> {
        Ok(self.inner.read().data.values().cloned().collect())
    }

    /// Fetch the item stored under `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if there is no such item.
    pub fn get(&self, id: TodoId) -> Result<TodoItem> {
        self.inner
            .read()
            .data
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Replace the item stored under `id`, forcing `new_state.id = id`.
    ///
    /// # Errors
    ///
    /// `BadInput` if `new_state` is `None`, `NotFound` if there is no item
    /// under `id`. The store is left untouched in both cases.
    pub fn update(&self, id: TodoId, new_state: Option<TodoItem>) -> Result<()> {
        let mut new_state =
            new_state.ok_or_else(|| StoreError::bad_input("new state cannot be empty"))?;
        new_state.id = id;

        let mut inner = self.inner.write();
        let slot = inner.data.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = new_state;
        drop(inner);

        tracing::debug!(id, "todo item updated");
        Ok(())
    }

    /// Remove the item stored under `id`. The id is never reissued.
    ///
    /// # Errors
    ///
    /// `BadInput` for the reserved id `0`, `NotFound` if there is no item
    /// under `id`.
    pub fn delete(&self, id: TodoId) -> Result<()> {
        if id == 0 {
            return Err(StoreError::bad_input("0 is not a valid id"));
        }

        let removed = self.inner.write().data.remove(&id);
        if removed.is_none() {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(id, "todo item deleted");
        Ok(())
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    /// Whether the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().data.is_empty()
    }

    /// The id the next successful `create` will assign.
    #[must_use]
    pub fn next_id(&self) -> TodoId {
        self.inner.read().next_id
    }

    /// Consistent snapshot of [`len`](Self::len) and
    /// [`next_id`](Self::next_id).
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        StoreStats {
            len: inner.data.len(),
            next_id: inner.next_id,
        }
    }
}

impl TodoStore for MemoryStore {
    fn create(&self, item: Option<TodoItem>) -> StoreFuture<'_, TodoItem> {
        Box::pin(future::ready(Self::create(self, item)))
    }

    fn get_all(&self) -> StoreFuture<'_, Vec<TodoItem>> {
        Box::pin(future::ready(Self::get_all(self)))
    }

    fn get(&self, id: TodoId) -> StoreFuture<'_, TodoItem> {
        Box::pin(future::ready(Self::get(self, id)))
    }

    fn update(&self, id: TodoId, new_state: Option<TodoItem>) -> StoreFuture<'_, ()> {
        Box::pin(future::ready(Self::update(self, id, new_state)))
    }

    fn delete(&self, id: TodoId) -> StoreFuture<'_, ()> {
        Box::pin(future::ready(Self::delete(self, id)))
    }
}
