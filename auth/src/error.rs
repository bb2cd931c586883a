//! Error types for credential loading and auth configuration.

use thiserror::Error;

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failures while building a credential store.
///
/// A wrong password is not an error: verification simply returns `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A stored password hash is not a bcrypt hash.
    #[error("Malformed password hash: {reason}")]
    MalformedHash {
        /// What was wrong with it
        reason: String,
    },

    /// The credential file is not a JSON object of strings.
    #[error("Invalid credential file: {0}")]
    InvalidCredentialFile(String),

    /// A new hash could not be produced.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// An auth mode other than `dev` or `prod` was configured.
    #[error("Unknown auth mode '{0}', expected 'dev' or 'prod'")]
    UnknownMode(String),
}

impl AuthError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedHash {
            reason: reason.into(),
        }
    }
}
