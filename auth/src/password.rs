//! bcrypt password hashes.
//!
//! ## Format
//!
//! ```text
//! $2b$<cost>$<22-char salt><31-char digest>
//! ```
//!
//! Standard modular-crypt bcrypt; `$2a$`, `$2x$` and `$2y$` hashes produced
//! by other tools verify as well. The digest comparison inside
//! [`bcrypt::verify`] is constant time.

use crate::error::{AuthError, Result};
use bcrypt::HashParts;
use std::fmt;
use std::str::FromStr;

/// Work factor used by [`PasswordHash::generate`].
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// A validated bcrypt hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    encoded: String,
}

impl PasswordHash {
    /// Parse a bcrypt hash in modular-crypt form.
    ///
    /// # Errors
    ///
    /// `MalformedHash` if the version, cost, salt or length is wrong.
    pub fn parse(encoded: &str) -> Result<Self> {
        HashParts::from_str(encoded).map_err(|e| AuthError::malformed(e.to_string()))?;
        Ok(Self {
            encoded: encoded.to_string(),
        })
    }

    /// Hash `password` with [`DEFAULT_COST`] under a fresh random salt.
    ///
    /// # Errors
    ///
    /// `Hashing` if the system random source is unavailable.
    pub fn generate(password: &str) -> Result<Self> {
        Self::generate_with_cost(password, DEFAULT_COST)
    }

    /// Hash `password` with an explicit work factor (4 to 31).
    ///
    /// # Errors
    ///
    /// `Hashing` if `cost` is out of range or no salt could be drawn.
    pub fn generate_with_cost(password: &str, cost: u32) -> Result<Self> {
        let encoded =
            bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self { encoded })
    }

    /// Work factor this hash was produced with.
    #[must_use]
    pub fn cost(&self) -> u32 {
        HashParts::from_str(&self.encoded)
            .as_ref()
            .map_or(0, HashParts::get_cost)
    }

    /// Check `password` against this hash.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.encoded).unwrap_or(false)
    }
}

impl FromStr for PasswordHash {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

// Never print hashes into logs.
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BOB: &str = "$2b$08$rS6jz7bKXArApIoc36neLej7Gud8eXTXDLdCzD.KnyPcUQrWy62zK";

    // OpenBSD reference vector for "U*U".
    const REFERENCE: &str = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    #[test]
    fn test_verify_known_hash() {
        let hash = PasswordHash::parse(BOB).unwrap();
        assert!(hash.verify("bob"));
        assert!(!hash.verify("Bob"));
        assert!(!hash.verify(""));
        assert_eq!(hash.cost(), 8);
    }

    #[test]
    fn test_verify_reference_vector() {
        let hash = PasswordHash::parse(REFERENCE).unwrap();
        assert!(hash.verify("U*U"));
        assert!(!hash.verify("U*V"));
    }

    #[test]
    fn test_display_roundtrip() {
        let hash = PasswordHash::parse(BOB).unwrap();
        assert_eq!(hash.to_string(), BOB);
    }

    #[test]
    fn test_generate_uses_fresh_salt() {
        let a = PasswordHash::generate_with_cost("secret", 4).unwrap();
        let b = PasswordHash::generate_with_cost("secret", 4).unwrap();
        assert!(a.verify("secret"));
        assert!(b.verify("secret"));
        assert!(!a.verify("Secret"));
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("$2b$04$"));
    }

    #[test]
    fn test_generate_rejects_bad_cost() {
        assert!(matches!(
            PasswordHash::generate_with_cost("secret", 3),
            Err(AuthError::Hashing(_))
        ));
    }

    #[test]
    fn test_malformed() {
        for bad in [
            "",
            "plaintext",
            "$sha256$Jxjfy1RAlwaxx9ybs4DLcQ$x1vEnXQ32PIUIQfQmnQecL+3vKsdMe0vcGn+mlCUOYg",
            "$2b$08$tooshort",
            "$2b$xx$rS6jz7bKXArApIoc36neLej7Gud8eXTXDLdCzD.KnyPcUQrWy62zK",
            "$9z$08$rS6jz7bKXArApIoc36neLej7Gud8eXTXDLdCzD.KnyPcUQrWy62zK",
        ] {
            assert!(
                matches!(PasswordHash::parse(bad), Err(AuthError::MalformedHash { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_debug_hides_hash() {
        let hash = PasswordHash::parse(BOB).unwrap();
        assert_eq!(format!("{hash:?}"), "PasswordHash { .. }");
    }
}
