//! Username to password-hash lookup.
//!
//! Credential stores are read-only configuration: they are built once at
//! startup and handed to the web layer as an `Arc<dyn CredentialStore>`.
//!
//! # Implementations
//!
//! - [`StaticCredentialStore`]: fixed map, parsed from JSON such as the
//!   embedded development file
//! - [`DenyAllCredentialStore`]: knows nobody, so every request is rejected

use crate::error::{AuthError, Result};
use crate::password::PasswordHash;
use std::collections::HashMap;

/// Development credentials compiled into the binary.
const DEV_CREDENTIALS: &str = include_str!("../keys/auth.dev.json");

/// Hash checked when the username is unknown, so a miss costs the same as a
/// wrong password. Same cost as the development credentials.
const DUMMY_HASH: &str = "$2b$08$jeEUJdUbYZYr14Qhlh/Sc.3wdf7oJrHNfQZ0NWw4Ci33aJFyBGPum";

/// Source of stored password hashes.
pub trait CredentialStore: Send + Sync {
    /// The stored hash for `username`, if the user exists.
    fn password_hash(&self, username: &str) -> Option<&PasswordHash>;

    /// Whether `password` is correct for `username`.
    ///
    /// Unknown users are checked against a throwaway hash before returning
    /// `false`.
    fn verify(&self, username: &str, password: &str) -> bool {
        match self.password_hash(username) {
            Some(hash) => hash.verify(password),
            None => {
                let _ = bcrypt::verify(password, DUMMY_HASH);
                false
            }
        }
    }
}

/// Fixed, read-only credential map.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    users: HashMap<String, PasswordHash>,
}

impl StaticCredentialStore {
    /// Build a store from already-parsed entries.
    #[must_use]
    pub fn new(users: HashMap<String, PasswordHash>) -> Self {
        Self { users }
    }

    /// Parse a JSON object mapping usernames to encoded hashes.
    ///
    /// ```json
    /// { "bob": "$2b$08$<salt><digest>" }
    /// ```
    ///
    /// # Errors
    ///
    /// - `InvalidCredentialFile`: not a JSON object of strings
    /// - `MalformedHash`: an entry is not a valid hash
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| AuthError::InvalidCredentialFile(e.to_string()))?;

        let users = raw
            .into_iter()
            .map(|(user, hash)| PasswordHash::parse(&hash).map(|hash| (user, hash)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { users })
    }

    /// Load the development credentials embedded at build time.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded file itself is broken.
    pub fn dev() -> Result<Self> {
        let store = Self::from_json(DEV_CREDENTIALS)?;
        tracing::debug!(users = store.len(), "Loaded development credential store");
        Ok(store)
    }

    /// Number of known users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for StaticCredentialStore {
    fn password_hash(&self, username: &str) -> Option<&PasswordHash> {
        self.users.get(username)
    }
}

/// Credential store that recognises no one.
///
/// Stands in for an external identity provider, which this service does not
/// integrate with.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllCredentialStore;

impl CredentialStore for DenyAllCredentialStore {
    fn password_hash(&self, _username: &str) -> Option<&PasswordHash> {
        None
    }
}
