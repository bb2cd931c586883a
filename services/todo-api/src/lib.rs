//! # todo-api
//!
//! The todo item REST service: configuration, listeners and shutdown
//! around the [`todo_svc_web`] router and the in-memory store.
//!
//! ## Modules
//!
//! - [`config`]: `TODO_`-prefixed environment configuration
//! - [`lifecycle`]: stop signals, cancellation token and bounded drain
//! - [`app`]: wires config into the API and debug listeners
//! - [`debug`]: `/debug/vars`, `/metrics` and `/health` on the debug address
//! - [`metrics`]: Prometheus recorder
//! - [`tls`]: certificate loading for the API listener

pub mod app;
pub mod config;
pub mod debug;
pub mod lifecycle;
pub mod metrics;
pub mod tls;

pub use app::{Application, Running};
pub use config::{Config, ConfigError, TlsFiles};
pub use lifecycle::{
    ServeError, ServeHandle, ServeOptions, ShutdownToken, interrupt_token, serve_until_cancelled,
    serve_with,
};
pub use tls::TlsError;
