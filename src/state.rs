//! Probe state shared between the HTTP handlers
//!
//! Two independent flags, each in its own atomic cell:
//! - `healthy` backs the liveness route (`/healthy`)
//! - `ready` backs the readiness route (`/ready`)
//!
//! Both start out `true`. Reads and writes of one flag never touch the other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared liveness/readiness flags
///
/// Constructed once at startup and handed to the router; clones share
/// the same underlying flags.
#[derive(Debug, Clone)]
pub struct ProbeState {
    healthy: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
}

impl ProbeState {
    /// Create a new probe state (healthy and ready)
    pub fn new() -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(true)),
            ready: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Overwrite the health flag
    pub fn set_healthy(&self, value: bool) {
        self.healthy.store(value, Ordering::SeqCst);
    }

    /// Check if the process reports itself as healthy
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Overwrite the ready flag
    pub fn set_ready(&self, value: bool) {
        self.ready.store(value, Ordering::SeqCst);
    }

    /// Check if the process reports itself as ready for traffic
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl Default for ProbeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
