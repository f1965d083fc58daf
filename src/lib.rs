//! flipprobe: liveness and readiness probes that can be flipped over HTTP
//!
//! Serves `/healthy` and `/ready` for an orchestrator's probes, plus
//! `/debug/{action}` routes that flip either flag for failure-injection
//! and rollout testing.

pub mod config;
pub mod lifecycle;
pub mod server;
pub mod state;
