//! Configuration for the todo API service.
//!
//! Every setting comes from a `TODO_`-prefixed environment variable and has
//! a default, so the service starts with no environment at all. A `.env`
//! file is loaded by the binary before [`Config::from_env`] runs.
//!
//! Durations are whole seconds, with or without an `s` suffix (`"5"`,
//! `"5s"`).

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use todo_svc_auth::AuthMode;

/// Prefix shared by every configuration key.
pub const ENV_PREFIX: &str = "TODO";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,todo_api=debug,todo_svc_web=debug";

/// Build tag baked in at compile time through `TODO_BUILD`.
pub const BUILD: &str = match option_env!("TODO_BUILD") {
    Some(build) => build,
    None => "develop",
};

/// Configuration keys, without the prefix.
mod keys {
    pub const WEB_READ_TIMEOUT: &str = "WEB_READ_TIMEOUT";
    pub const WEB_WRITE_TIMEOUT: &str = "WEB_WRITE_TIMEOUT";
    pub const WEB_IDLE_TIMEOUT: &str = "WEB_IDLE_TIMEOUT";
    pub const WEB_SHUTDOWN_TIMEOUT: &str = "WEB_SHUTDOWN_TIMEOUT";
    pub const WEB_API_HOST: &str = "WEB_API_HOST";
    pub const WEB_DEBUG_HOST: &str = "WEB_DEBUG_HOST";
    pub const WEB_CERT_FILE: &str = "WEB_CERT_FILE";
    pub const WEB_KEY_FILE: &str = "WEB_KEY_FILE";
    pub const AUTH_MODE: &str = "AUTH_MODE";
    pub const AUTH_KEYS_FOLDER: &str = "AUTH_KEYS_FOLDER";
    pub const DB_USER: &str = "DB_USER";
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
    pub const DB_HOST: &str = "DB_HOST";
    pub const DB_NAME: &str = "DB_NAME";
    pub const DB_MAX_IDLE_CONNS: &str = "DB_MAX_IDLE_CONNS";
    pub const DB_MAX_OPEN_CONNS: &str = "DB_MAX_OPEN_CONNS";
    pub const DB_DISABLE_TLS: &str = "DB_DISABLE_TLS";
}

/// Errors from loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value does not parse.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Full variable name, prefix included.
        key: String,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Only one half of a setting pair is set.
    #[error("{set} is set but {missing} is not, set both or neither")]
    Incomplete {
        /// Full name of the variable that is set.
        set: String,
        /// Full name of the variable that is missing.
        missing: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP listener settings.
    pub web: WebConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
    /// Database settings.
    pub db: DbConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// Limit on reading a request body.
    pub read_timeout: Duration,
    /// Limit on producing a response.
    pub write_timeout: Duration,
    /// How long a keep-alive connection may sit without sending a request.
    /// Zero disables the limit.
    pub idle_timeout: Duration,
    /// How long in-flight requests may drain after a stop signal.
    pub shutdown_timeout: Duration,
    /// API bind address.
    pub api_host: SocketAddr,
    /// Debug and metrics bind address.
    pub debug_host: SocketAddr,
    /// Certificate and key for serving the API over TLS outside dev mode.
    pub tls: Option<TlsFiles>,
}

/// PEM files for the API listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// Certificate chain, leaf first.
    pub cert_file: PathBuf,
    /// Private key for the leaf certificate.
    pub key_file: PathBuf,
}

/// Authentication settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Credential source.
    pub mode: AuthMode,
    /// Folder holding key material.
    pub keys_folder: PathBuf,
}

/// Database settings. Accepted for deployment compatibility; the in-memory
/// store does not use them.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database user.
    pub user: String,
    /// Database password. Masked in `Debug` output.
    pub password: String,
    /// Database host.
    pub host: String,
    /// Database name.
    pub name: String,
    /// Idle connection cap (0 = driver default).
    pub max_idle_conns: u32,
    /// Open connection cap (0 = unlimited).
    pub max_open_conns: u32,
    /// Disable TLS to the database.
    pub disable_tls: bool,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("user", &self.user)
            .field("password", &"xxxxxx")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("max_open_conns", &self.max_open_conns)
            .field("disable_tls", &self.disable_tls)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first variable whose value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// `lookup` receives full variable names such as `TODO_WEB_API_HOST`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first variable whose value
    /// does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source { lookup };

        Ok(Self {
            web: WebConfig {
                read_timeout: source.duration(keys::WEB_READ_TIMEOUT, 5)?,
                write_timeout: source.duration(keys::WEB_WRITE_TIMEOUT, 10)?,
                idle_timeout: source.duration(keys::WEB_IDLE_TIMEOUT, 120)?,
                shutdown_timeout: source.duration(keys::WEB_SHUTDOWN_TIMEOUT, 20)?,
                api_host: source.parse(keys::WEB_API_HOST, || {
                    SocketAddr::from(([0, 0, 0, 0], 3000))
                })?,
                debug_host: source.parse(keys::WEB_DEBUG_HOST, || {
                    SocketAddr::from(([0, 0, 0, 0], 4000))
                })?,
                tls: source.tls_files()?,
            },
            auth: AuthConfig {
                mode: source.parse(keys::AUTH_MODE, AuthMode::default)?,
                keys_folder: source
                    .optional(keys::AUTH_KEYS_FOLDER)
                    .map_or_else(|| PathBuf::from("zarf/keys/"), PathBuf::from),
            },
            db: DbConfig {
                user: source.string(keys::DB_USER, "postgres"),
                password: source.string(keys::DB_PASSWORD, "postgres"),
                host: source.string(keys::DB_HOST, "localhost"),
                name: source.string(keys::DB_NAME, "postgres"),
                max_idle_conns: source.parse(keys::DB_MAX_IDLE_CONNS, || 0)?,
                max_open_conns: source.parse(keys::DB_MAX_OPEN_CONNS, || 0)?,
                disable_tls: source.parse(keys::DB_DISABLE_TLS, || true)?,
            },
        })
    }
}

/// Help text listing every key and its default.
#[must_use]
pub fn usage() -> String {
    let rows = [
        (keys::WEB_READ_TIMEOUT, "5s"),
        (keys::WEB_WRITE_TIMEOUT, "10s"),
        (keys::WEB_IDLE_TIMEOUT, "120s"),
        (keys::WEB_SHUTDOWN_TIMEOUT, "20s"),
        (keys::WEB_API_HOST, "0.0.0.0:3000"),
        (keys::WEB_DEBUG_HOST, "0.0.0.0:4000"),
        (keys::WEB_CERT_FILE, ""),
        (keys::WEB_KEY_FILE, ""),
        (keys::AUTH_MODE, "prod"),
        (keys::AUTH_KEYS_FOLDER, "zarf/keys/"),
        (keys::DB_USER, "postgres"),
        (keys::DB_PASSWORD, "postgres"),
        (keys::DB_HOST, "localhost"),
        (keys::DB_NAME, "postgres"),
        (keys::DB_MAX_IDLE_CONNS, "0"),
        (keys::DB_MAX_OPEN_CONNS, "0"),
        (keys::DB_DISABLE_TLS, "true"),
    ];

    let mut out = format!("Usage: todo-api\n\nEnvironment ({BUILD}):\n");
    for (key, default) in rows {
        out.push_str(&format!("  {ENV_PREFIX}_{key:<22} default: {default:?}\n"));
    }
    out
}

/// Prefixed view over a key lookup.
struct Source<F> {
    lookup: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn full_key(key: &str) -> String {
        format!("{ENV_PREFIX}_{key}")
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(&Self::full_key(key)).filter(|value| !value.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T, D>(&self, key: &str, default: D) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
        D: FnOnce() -> T,
    {
        match self.optional(key) {
            None => Ok(default()),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| invalid(key, &value, e.to_string())),
        }
    }

    fn tls_files(&self) -> Result<Option<TlsFiles>, ConfigError> {
        let cert = self.optional(keys::WEB_CERT_FILE);
        let key = self.optional(keys::WEB_KEY_FILE);

        match (cert, key) {
            (None, None) => Ok(None),
            (Some(cert), Some(key)) => Ok(Some(TlsFiles {
                cert_file: PathBuf::from(cert),
                key_file: PathBuf::from(key),
            })),
            (Some(_), None) => Err(incomplete(keys::WEB_CERT_FILE, keys::WEB_KEY_FILE)),
            (None, Some(_)) => Err(incomplete(keys::WEB_KEY_FILE, keys::WEB_CERT_FILE)),
        }
    }

    fn duration(&self, key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
        match self.optional(key) {
            None => Ok(Duration::from_secs(default_secs)),
            Some(value) => parse_seconds(&value).ok_or_else(|| {
                invalid(key, &value, "expected whole seconds such as \"5\" or \"5s\"")
            }),
        }
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: format!("{ENV_PREFIX}_{key}"),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn incomplete(set: &str, missing: &str) -> ConfigError {
    ConfigError::Incomplete {
        set: format!("{ENV_PREFIX}_{set}"),
        missing: format!("{ENV_PREFIX}_{missing}"),
    }
}

fn parse_seconds(value: &str) -> Option<Duration> {
    let value = value.trim();
    let digits = value.strip_suffix('s').unwrap_or(value);
    digits.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.web.read_timeout, Duration::from_secs(5));
        assert_eq!(config.web.write_timeout, Duration::from_secs(10));
        assert_eq!(config.web.idle_timeout, Duration::from_secs(120));
        assert_eq!(config.web.shutdown_timeout, Duration::from_secs(20));
        assert_eq!(config.web.api_host.to_string(), "0.0.0.0:3000");
        assert_eq!(config.web.debug_host.to_string(), "0.0.0.0:4000");
        assert_eq!(config.web.tls, None);
        assert_eq!(config.auth.mode, AuthMode::Prod);
        assert_eq!(config.auth.keys_folder, PathBuf::from("zarf/keys/"));
        assert_eq!(config.db.user, "postgres");
        assert_eq!(config.db.max_open_conns, 0);
        assert!(config.db.disable_tls);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TODO_WEB_READ_TIMEOUT", "7s"),
            ("TODO_WEB_SHUTDOWN_TIMEOUT", "3"),
            ("TODO_WEB_API_HOST", "127.0.0.1:8080"),
            ("TODO_WEB_CERT_FILE", "/etc/tls/cert.pem"),
            ("TODO_WEB_KEY_FILE", "/etc/tls/key.pem"),
            ("TODO_AUTH_MODE", "DEV"),
            ("TODO_DB_MAX_IDLE_CONNS", "4"),
            ("TODO_DB_DISABLE_TLS", "false"),
        ])
        .unwrap();

        assert_eq!(config.web.read_timeout, Duration::from_secs(7));
        assert_eq!(config.web.shutdown_timeout, Duration::from_secs(3));
        assert_eq!(config.web.api_host.port(), 8080);
        assert_eq!(
            config.web.tls,
            Some(TlsFiles {
                cert_file: PathBuf::from("/etc/tls/cert.pem"),
                key_file: PathBuf::from("/etc/tls/key.pem"),
            })
        );
        assert_eq!(config.auth.mode, AuthMode::Dev);
        assert_eq!(config.db.max_idle_conns, 4);
        assert!(!config.db.disable_tls);
    }

    #[test]
    fn test_unprefixed_keys_ignored() {
        let config = load(&[("WEB_API_HOST", "127.0.0.1:1")]).unwrap();
        assert_eq!(config.web.api_host.port(), 3000);
    }

    #[test]
    fn test_blank_value_uses_default() {
        let config = load(&[("TODO_WEB_WRITE_TIMEOUT", "  ")]).unwrap();
        assert_eq!(config.web.write_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_values_name_the_key() {
        let cases = [
            ("TODO_WEB_READ_TIMEOUT", "soon"),
            ("TODO_WEB_IDLE_TIMEOUT", "-1s"),
            ("TODO_WEB_API_HOST", "localhost"),
            ("TODO_AUTH_MODE", "staging"),
            ("TODO_DB_MAX_OPEN_CONNS", "many"),
            ("TODO_DB_DISABLE_TLS", "yes"),
        ];

        for (key, value) in cases {
            let err = load(&[(key, value)]).unwrap_err();
            let ConfigError::Invalid {
                key: got,
                value: got_value,
                ..
            } = &err
            else {
                panic!("expected Invalid, got {err:?}");
            };
            assert_eq!(got, key);
            assert_eq!(got_value, value);
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn test_half_configured_tls_rejected() {
        let err = load(&[("TODO_WEB_CERT_FILE", "/etc/tls/cert.pem")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Incomplete {
                set: "TODO_WEB_CERT_FILE".to_string(),
                missing: "TODO_WEB_KEY_FILE".to_string(),
            }
        );

        let err = load(&[("TODO_WEB_KEY_FILE", "/etc/tls/key.pem")]).unwrap_err();
        assert!(err.to_string().contains("TODO_WEB_CERT_FILE"));
    }

    #[test]
    fn test_debug_masks_password() {
        let config = load(&[("TODO_DB_PASSWORD", "hunter2")]).unwrap();
        assert_eq!(config.db.password, "hunter2");

        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("xxxxxx"));
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_seconds(" 120s "), Some(Duration::from_secs(120)));
        assert_eq!(parse_seconds("5m"), None);
        assert_eq!(parse_seconds("s"), None);
    }

    #[test]
    fn test_usage_lists_every_key() {
        let text = usage();
        assert!(text.contains("TODO_WEB_API_HOST"));
        assert!(text.contains("TODO_DB_DISABLE_TLS"));
    }
}
