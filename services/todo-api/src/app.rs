//! Application wiring.
//!
//! [`Application::build`] turns a [`Config`] into the store, credential
//! source, TLS settings and metrics handle; [`Application::start`] binds both
//! listeners; [`Running::wait`] blocks until both have shut down.
//!
//! The API listener serves HTTPS when a certificate and key are configured
//! outside dev mode. The debug listener is always plain HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! let token = interrupt_token()?;
//! let app = Application::build(config)?;
//! app.run(token).await?;
//! ```

use crate::config::Config;
use crate::debug::debug_router;
use crate::lifecycle::{ServeError, ServeHandle, ServeOptions, ShutdownToken, serve_with};
use crate::metrics::install_recorder;
use crate::tls;
use anyhow::Context;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use todo_svc_auth::{AuthMode, CredentialStore, DenyAllCredentialStore, StaticCredentialStore};
use todo_svc_core::MemoryStore;
use todo_svc_web::{AppState, HttpTimeouts, build_router};
use tokio::net::TcpListener;
use tokio_rustls::rustls::ServerConfig;
use tracing::{info, warn};

/// Fully wired, not yet listening.
pub struct Application {
    config: Config,
    store: Arc<MemoryStore>,
    credentials: Arc<dyn CredentialStore>,
    tls: Option<Arc<ServerConfig>>,
    metrics: PrometheusHandle,
}

/// Both listeners up and serving.
#[derive(Debug)]
pub struct Running {
    api: ServeHandle,
    debug: ServeHandle,
}

impl Application {
    /// Wire the application from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the credential store, TLS certificate or metrics
    /// recorder cannot be set up.
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let credentials = credential_store(&config)?;
        let tls = api_tls(&config)?;
        let metrics = install_recorder().context("installing metrics recorder")?;

        Ok(Self {
            config,
            store: Arc::new(MemoryStore::new()),
            credentials,
            tls,
            metrics,
        })
    }

    /// The store backing this application.
    #[must_use]
    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Router served on the API listener.
    #[must_use]
    pub fn api_router(&self) -> Router {
        let state = AppState::new(self.store.clone(), Arc::clone(&self.credentials));
        build_router(
            state,
            HttpTimeouts {
                read: self.config.web.read_timeout,
                write: self.config.web.write_timeout,
            },
        )
    }

    /// Router served on the debug listener.
    #[must_use]
    pub fn debug_router(&self) -> Router {
        debug_router(self.store.clone(), self.metrics.clone())
    }

    /// Bind both listeners and start serving until `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns error if either address cannot be bound.
    pub async fn start(self, token: ShutdownToken) -> anyhow::Result<Running> {
        let web = &self.config.web;
        let options = ServeOptions::new(web.shutdown_timeout).with_idle_timeout(web.idle_timeout);

        let debug_listener = TcpListener::bind(web.debug_host)
            .await
            .with_context(|| format!("binding debug listener on {}", web.debug_host))?;
        let debug_server = serve_with(
            debug_listener,
            self.debug_router(),
            token.clone(),
            options.clone(),
        )?;
        info!(addr = %debug_server.local_addr(), "Debug listener started");

        let api_listener = TcpListener::bind(web.api_host)
            .await
            .with_context(|| format!("binding API listener on {}", web.api_host))?;

        if self.config.auth.mode.is_dev() {
            info!("Starting server in DEV MODE...");
        } else {
            info!("Starting server...");
        }

        let tls = self.tls.is_some();
        let api_options = match &self.tls {
            Some(config) => options.with_tls(Arc::clone(config)),
            None => options,
        };
        let api = serve_with(api_listener, self.api_router(), token, api_options)?;
        info!(addr = %api.local_addr(), tls, "API listener started");

        Ok(Running {
            api,
            debug: debug_server,
        })
    }

    /// Start serving and wait for shutdown.
    ///
    /// # Errors
    ///
    /// Returns error if a listener cannot be bound or a server fails.
    pub async fn run(self, token: ShutdownToken) -> anyhow::Result<()> {
        let running = self.start(token).await?;
        running.wait().await?;
        Ok(())
    }
}

impl Running {
    /// Address the API is served on.
    #[must_use]
    pub const fn api_addr(&self) -> SocketAddr {
        self.api.local_addr()
    }

    /// Address the debug routes are served on.
    #[must_use]
    pub const fn debug_addr(&self) -> SocketAddr {
        self.debug.local_addr()
    }

    /// Wait for both listeners to stop.
    ///
    /// # Errors
    ///
    /// Returns the API server's error if it failed, otherwise the debug
    /// server's.
    pub async fn wait(self) -> Result<(), ServeError> {
        let (api_result, debug_result) = tokio::join!(self.api, self.debug);
        if let Err(error) = &debug_result {
            warn!(%error, "Debug listener stopped with error");
        }
        info!("Shutdown complete");
        api_result.and(debug_result)
    }
}

/// Credential source for the configured auth mode.
fn credential_store(config: &Config) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match config.auth.mode {
        AuthMode::Dev => {
            let store = StaticCredentialStore::dev().context("loading dev credentials")?;
            warn!(users = store.len(), "Authenticating against DEV credentials");
            Ok(Arc::new(store))
        }
        AuthMode::Prod => {
            warn!("No production identity source is configured, all API requests will be rejected");
            Ok(Arc::new(DenyAllCredentialStore))
        }
    }
}

/// TLS settings for the API listener. Certificates are only used outside
/// dev mode.
fn api_tls(config: &Config) -> anyhow::Result<Option<Arc<ServerConfig>>> {
    match (&config.web.tls, config.auth.mode) {
        (Some(files), AuthMode::Prod) => {
            let tls = tls::server_config(files).context("loading TLS certificate")?;
            Ok(Some(tls))
        }
        (Some(_), AuthMode::Dev) => {
            warn!("TLS certificate ignored in DEV MODE, serving plain HTTP");
            Ok(None)
        }
        (None, AuthMode::Prod) => {
            warn!("No TLS certificate configured, serving plain HTTP");
            Ok(None)
        }
        (None, AuthMode::Dev) => Ok(None),
    }
}
