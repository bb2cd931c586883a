//! # todo-svc authentication
//!
//! Credential lookup and password verification for HTTP Basic auth.
//!
//! ## Pieces
//!
//! - [`PasswordHash`]: bcrypt hashes
//! - [`CredentialStore`]: username to password-hash lookup, injected into the
//!   web layer
//! - [`StaticCredentialStore`]: read-only map loaded once at startup, including
//!   the embedded development credentials
//! - [`AuthMode`]: selects which store the service runs with
//!
//! ## Example
//!
//! ```
//! use todo_svc_auth::{CredentialStore, StaticCredentialStore};
//!
//! let store = StaticCredentialStore::dev().unwrap();
//! assert!(store.verify("bob", "bob"));
//! assert!(!store.verify("bob", "alice"));
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod credentials;
pub mod error;
pub mod mode;
pub mod password;

pub use credentials::{CredentialStore, DenyAllCredentialStore, StaticCredentialStore};
pub use error::{AuthError, Result};
pub use mode::AuthMode;
pub use password::PasswordHash;
