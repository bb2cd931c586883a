//! Authentication mode switch.

use crate::error::AuthError;
use std::fmt;
use std::str::FromStr;

/// Which credential source the service authenticates against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Embedded development credentials.
    Dev,
    /// Production identity source. Must stay the default.
    #[default]
    Prod,
}

impl AuthMode {
    /// Whether the embedded development credentials are in use.
    #[must_use]
    pub const fn is_dev(self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl FromStr for AuthMode {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            _ => Err(AuthError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("dev".parse::<AuthMode>().unwrap(), AuthMode::Dev);
        assert_eq!(" PROD ".parse::<AuthMode>().unwrap(), AuthMode::Prod);
        assert_eq!(
            "staging".parse::<AuthMode>(),
            Err(AuthError::UnknownMode("staging".to_string()))
        );
    }

    #[test]
    fn test_default_is_prod() {
        assert_eq!(AuthMode::default(), AuthMode::Prod);
        assert!(!AuthMode::default().is_dev());
    }
}
