//! HTTP server for probe and debug endpoints
//!
//! Provides the orchestrator probes:
//! - `/healthy` - Liveness probe
//! - `/ready` - Readiness probe
//! - `/debug/{action}` - Failure injection
//!
//! Also provides graceful shutdown handling for SIGTERM/SIGINT.

mod health;
pub mod shutdown;

pub use health::{build_router, DebugAction};
pub use shutdown::TerminationSignals;

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
