//! Shared state handed to every handler.

use std::sync::Arc;
use todo_svc_auth::CredentialStore;
use todo_svc_core::TodoStore;

/// Application state shared across all HTTP handlers.
///
/// Both members are trait objects so the binary decides which store and
/// which credential source to run with; handlers only see the contracts.
///
/// # Examples
///
/// ```ignore
/// async fn list(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, AppError> {
///     Ok(Json(state.store.get_all().await?))
/// }
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Todo persistence.
    pub store: Arc<dyn TodoStore>,
    /// Basic-auth credential lookup.
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { store, credentials }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_svc_auth::DenyAllCredentialStore;
    use todo_svc_core::MemoryStore;

    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_store() {
        let memory = Arc::new(MemoryStore::new());
        let state = AppState::new(memory.clone(), Arc::new(DenyAllCredentialStore));
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.store, &cloned.store));
        assert_eq!(Arc::strong_count(&memory), 3);
    }
}
