//! Termination signal handling
//!
//! SIGTERM and SIGINT start a graceful shutdown:
//! - The listener stops accepting new connections
//! - In-flight requests get a bounded grace period to finish
//!
//! The drain itself lives in `lifecycle::RunningServer`.

use std::io;
use tracing::info;

/// Registered SIGTERM/SIGINT handlers
///
/// Registration happens up front so a signal delivered before anyone is
/// waiting (for example during the startup delay) is queued, not lost.
#[cfg(unix)]
pub struct TerminationSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    /// Register handlers for SIGTERM and SIGINT
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the next termination signal and return its name
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => {
                info!("Received SIGTERM");
                "SIGTERM"
            }
            _ = self.sigint.recv() => {
                info!("Received SIGINT");
                "SIGINT"
            }
        }
    }
}

/// Registered Ctrl+C handler (Windows)
#[cfg(windows)]
pub struct TerminationSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl TerminationSignals {
    /// Register the Ctrl+C handler
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Wait for the next Ctrl+C and return its name
    pub async fn recv(&mut self) -> &'static str {
        self.ctrl_c.recv().await;
        info!("Received Ctrl+C");
        "CTRL_C"
    }
}
