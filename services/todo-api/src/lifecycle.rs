//! Process lifecycle: stop signals and the serve loop.
//!
//! # Shutdown
//!
//! 1. The first SIGINT or SIGTERM cancels the [`ShutdownToken`]
//! 2. Every server started with [`serve_with`] stops accepting and asks
//!    each open connection to finish its current request
//! 3. Draining is bounded by the shutdown timeout; stragglers are aborted
//! 4. A second signal before the process exits terminates it with code 1

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tracing::{debug, error, info, warn};

/// Pause after a failed `accept`, typically file descriptor exhaustion.
const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Limit on completing a TLS handshake.
const TLS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from running a server.
#[derive(Error, Debug)]
pub enum ServeError {
    /// In-flight requests did not drain in time and were aborted.
    #[error("Graceful shutdown did not finish within {0:?}")]
    ShutdownTimedOut(Duration),

    /// The server task panicked or was cancelled.
    #[error("Server task failed: {0}")]
    Join(#[from] JoinError),
}

/// Cloneable cancellation flag.
///
/// Cancelling any clone cancels all of them. Cancellation is permanent.
#[derive(Clone, Debug)]
pub struct ShutdownToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownToken {
    /// Create a token that is not yet cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Cancel the token. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// Token cancelled by the first SIGINT or SIGTERM.
///
/// A second signal logs and exits the process with status 1 without waiting
/// for shutdown to finish.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the signal handlers cannot be installed.
pub fn interrupt_token() -> io::Result<ShutdownToken> {
    let mut signals = Signals::install()?;
    let token = ShutdownToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        match signals.recv().await {
            Ok(signal) => info!(signal, "Received signal, initiating controlled stop"),
            Err(error) => {
                warn!(%error, "Signal listener failed, controlled stop unavailable");
                return;
            }
        }
        trigger.cancel();

        if let Ok(signal) = signals.recv().await {
            error!(signal, "Received second signal, stopping now");
            std::process::exit(1);
        }
    });

    Ok(token)
}

/// SIGINT and SIGTERM listeners, installed once so a repeat signal is never
/// missed between waits.
struct Signals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Signals {
    #[cfg(unix)]
    fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) -> io::Result<&'static str> {
        tokio::select! {
            _ = self.interrupt.recv() => Ok("SIGINT"),
            _ = self.terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> io::Result<&'static str> {
        tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
    }
}

/// Completion handle for a server started by [`serve_with`].
///
/// Resolves when the listener has stopped.
#[derive(Debug)]
pub struct ServeHandle {
    local_addr: SocketAddr,
    task: JoinHandle<Result<(), ServeError>>,
}

impl ServeHandle {
    /// Address the server is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Future for ServeHandle {
    type Output = Result<(), ServeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task)
            .poll(cx)
            .map(|joined| joined.map_err(ServeError::from).and_then(|served| served))
    }
}

/// Connection settings for [`serve_with`].
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// How long in-flight requests may drain after cancellation.
    pub shutdown_timeout: Duration,
    /// Close a connection that has not sent a complete request head for
    /// this long, including the wait between keep-alive requests.
    pub idle_timeout: Option<Duration>,
    /// Terminate TLS on every accepted connection.
    pub tls: Option<Arc<ServerConfig>>,
}

impl ServeOptions {
    /// Plain HTTP with no idle limit.
    #[must_use]
    pub const fn new(shutdown_timeout: Duration) -> Self {
        Self {
            shutdown_timeout,
            idle_timeout: None,
            tls: None,
        }
    }

    /// Set the idle limit. Zero disables it.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = (!idle_timeout.is_zero()).then_some(idle_timeout);
        self
    }

    /// Serve HTTPS with `config`.
    #[must_use]
    pub fn with_tls(mut self, config: Arc<ServerConfig>) -> Self {
        self.tls = Some(config);
        self
    }
}

/// Serve `router` on `listener` over plain HTTP until `token` is cancelled.
///
/// Shorthand for [`serve_with`] without idle limit or TLS.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be read.
pub fn serve_until_cancelled(
    listener: TcpListener,
    router: Router,
    token: ShutdownToken,
    shutdown_timeout: Duration,
) -> io::Result<ServeHandle> {
    serve_with(listener, router, token, ServeOptions::new(shutdown_timeout))
}

/// Serve `router` on `listener` until `token` is cancelled.
///
/// After cancellation the server stops accepting and waits up to
/// `options.shutdown_timeout` for in-flight requests; past that it is
/// aborted and the handle yields [`ServeError::ShutdownTimedOut`].
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be read.
pub fn serve_with(
    listener: TcpListener,
    router: Router,
    token: ShutdownToken,
    options: ServeOptions,
) -> io::Result<ServeHandle> {
    let local_addr = listener.local_addr()?;

    let connection = ConnectionSettings {
        router,
        token: token.clone(),
        idle_timeout: options.idle_timeout,
    };
    let tls = options.tls.map(TlsAcceptor::from);
    let server = tokio::spawn(accept_loop(listener, connection, tls));

    let task = tokio::spawn(supervise(
        server,
        token,
        options.shutdown_timeout,
        local_addr,
    ));

    Ok(ServeHandle { local_addr, task })
}

/// Wait for the server to exit on its own, or for cancellation followed by
/// a bounded drain.
async fn supervise(
    mut server: JoinHandle<()>,
    token: ShutdownToken,
    shutdown_timeout: Duration,
    local_addr: SocketAddr,
) -> Result<(), ServeError> {
    tokio::select! {
        joined = &mut server => return Ok(joined?),
        () = token.cancelled() => {}
    }

    info!(addr = %local_addr, "Received controlled stop signal");

    if let Ok(joined) = tokio::time::timeout(shutdown_timeout, &mut server).await {
        Ok(joined?)
    } else {
        warn!(
            addr = %local_addr,
            timeout = ?shutdown_timeout,
            "Graceful shutdown timed out, aborting"
        );
        server.abort();
        Err(ServeError::ShutdownTimedOut(shutdown_timeout))
    }
}

/// What every connection task needs.
#[derive(Clone)]
struct ConnectionSettings {
    router: Router,
    token: ShutdownToken,
    idle_timeout: Option<Duration>,
}

/// Accept until cancelled, then wait for every open connection to finish.
async fn accept_loop(
    listener: TcpListener,
    settings: ConnectionSettings,
    tls: Option<TlsAcceptor>,
) {
    // Each connection task holds a receiver; `closed` resolves once all are gone.
    let (open_tx, open_rx) = watch::channel(());

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(error) => {
                    warn!(%error, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
            () = settings.token.cancelled() => break,
        };

        let settings = settings.clone();
        let tls = tls.clone();
        let open = open_rx.clone();
        tokio::spawn(async move {
            match tls {
                Some(acceptor) => serve_tls(stream, peer, &acceptor, settings).await,
                None => serve_connection(stream, peer, settings).await,
            }
            drop(open);
        });
    }

    drop(listener);
    drop(open_rx);
    open_tx.closed().await;
}

async fn serve_tls(
    stream: TcpStream,
    peer: SocketAddr,
    acceptor: &TlsAcceptor,
    settings: ConnectionSettings,
) {
    match tokio::time::timeout(TLS_HANDSHAKE_TIMEOUT, acceptor.accept(stream)).await {
        Ok(Ok(stream)) => serve_connection(stream, peer, settings).await,
        Ok(Err(error)) => debug!(%peer, %error, "TLS handshake failed"),
        Err(_) => debug!(%peer, "TLS handshake timed out"),
    }
}

/// Serve HTTP on one connection, finishing the current request and closing
/// once the token is cancelled.
async fn serve_connection<I>(io: I, peer: SocketAddr, settings: ConnectionSettings)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let ConnectionSettings {
        router,
        token,
        idle_timeout,
    } = settings;

    let mut builder = Builder::new(TokioExecutor::new());
    if let Some(idle_timeout) = idle_timeout {
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(idle_timeout);
    }

    let connection = builder
        .serve_connection_with_upgrades(TokioIo::new(io), TowerToHyperService::new(router));
    tokio::pin!(connection);

    let cancelled = token.cancelled();
    tokio::pin!(cancelled);
    let mut draining = false;

    let served = loop {
        tokio::select! {
            served = connection.as_mut() => break served,
            () = &mut cancelled, if !draining => {
                draining = true;
                connection.as_mut().graceful_shutdown();
            }
        }
    };

    if let Err(error) = served {
        debug!(%peer, %error, "Connection closed with error");
    }
}
