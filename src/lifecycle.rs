//! Process lifecycle
//!
//! ```text
//! Initializing -> DelayingStartup -> Serving -> ShuttingDown -> Stopped
//! ```
//!
//! A bad startup delay ends the process in `Initializing`. A bind failure
//! ends it in `Serving` without a graceful shutdown. Draining in-flight
//! requests may take at most `SHUTDOWN_GRACE_PERIOD`; past that the
//! shutdown is forced and reported as an error.
//!
//! Once bound, `axum::serve` logs and retries accept errors on its own and
//! never returns them. A server task that ends before the shutdown signal
//! has therefore panicked; accept failures do not abort the process.

use crate::config::{Args, Config, ConfigError, StartupDelay, HTTP_PORT};
use crate::server::{build_router, TerminationSignals};
use crate::state::ProbeState;
use axum::Router;
use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

/// Time in-flight requests get to finish after a termination signal
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    DelayingStartup,
    Serving,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Initializing => "initializing",
            Phase::DelayingStartup => "delaying-startup",
            Phase::Serving => "serving",
            Phase::ShuttingDown => "shutting-down",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Fatal lifecycle conditions; each one ends the process with a non-zero exit
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot register signal handlers: {0}")]
    Signals(#[source] io::Error),

    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server failed: {0}")]
    Server(#[source] io::Error),

    #[error("server stopped without a shutdown signal")]
    ServerStopped,

    #[error("server task failed: {0}")]
    ServerTask(#[from] JoinError),

    #[error("server forced to shutdown: requests still in flight after {0:?}")]
    ShutdownTimeout(Duration),
}

fn enter(phase: Phase) {
    info!(phase = %phase, "Lifecycle phase");
}

/// HTTP server running on a background task
pub struct RunningServer {
    handle: JoinHandle<io::Result<()>>,
    shutdown: oneshot::Sender<()>,
    local_addr: SocketAddr,
}

impl RunningServer {
    /// Start serving `app` on an already-bound listener
    pub fn spawn(listener: TcpListener, app: Router) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;
        let (shutdown, drain) = oneshot::channel::<()>();

        // A dropped sender also starts the drain
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = drain.await;
                })
                .await
        });

        Ok(Self {
            handle,
            shutdown,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `stop` resolves, then drain within `grace`
    ///
    /// If the server task ends first (a panic, see the module docs) the
    /// error is returned as is, with no drain.
    pub async fn serve_until<F>(self, stop: F, grace: Duration) -> Result<(), LifecycleError>
    where
        F: Future<Output = &'static str>,
    {
        let RunningServer {
            mut handle,
            shutdown,
            ..
        } = self;

        tokio::select! {
            result = &mut handle => {
                return Err(match result {
                    Ok(Ok(())) => LifecycleError::ServerStopped,
                    Ok(Err(e)) => LifecycleError::Server(e),
                    Err(e) => LifecycleError::ServerTask(e),
                });
            }
            signal = stop => {
                info!(signal = signal, "Shutdown signal received, starting graceful shutdown...");
            }
        }

        enter(Phase::ShuttingDown);
        let _ = shutdown.send(());

        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(LifecycleError::Server(e)),
            Ok(Err(e)) => Err(LifecycleError::ServerTask(e)),
            Err(_) => {
                handle.abort();
                Err(LifecycleError::ShutdownTimeout(grace))
            }
        }
    }
}

/// Sleep for the startup delay; zero or negative delays skip the sleep
///
/// Not cancellable: a termination signal arriving now is handled once
/// serving has begun.
pub async fn delay_startup(delay: StartupDelay) {
    enter(Phase::DelayingStartup);
    match delay.sleep_duration() {
        Some(duration) => {
            info!(delay = %delay, "Waiting {} before starting the server...", delay);
            tokio::time::sleep(duration).await;
        }
        None if delay.is_negative() => {
            info!(delay = %delay, "Negative startup delay, starting immediately");
        }
        None => {}
    }
}

/// Run the whole process lifecycle on `0.0.0.0:8080`
pub async fn run(args: &Args) -> Result<(), LifecycleError> {
    enter(Phase::Initializing);
    let config = Config::from_env(args)?;
    let mut signals = TerminationSignals::register().map_err(LifecycleError::Signals)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], HTTP_PORT));
    run_on(addr, config, signals.recv()).await
}

/// Delay, bind `addr`, serve until `stop` resolves, then drain
///
/// `stop` is only polled once serving, so a signal it observes during the
/// startup delay is handled right after the server starts.
pub async fn run_on<F>(addr: SocketAddr, config: Config, stop: F) -> Result<(), LifecycleError>
where
    F: Future<Output = &'static str>,
{
    delay_startup(config.startup_delay).await;

    enter(Phase::Serving);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| LifecycleError::Bind { addr, source })?;
    info!(address = %addr, "Server is starting on port {}...", addr.port());

    let state = ProbeState::new();
    let server =
        RunningServer::spawn(listener, build_router(state)).map_err(LifecycleError::Server)?;
    info!(address = %server.local_addr(), "Server started.");

    server.serve_until(stop, SHUTDOWN_GRACE_PERIOD).await?;

    enter(Phase::Stopped);
    info!("Server exiting.");
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;
