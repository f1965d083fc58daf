//! Probe and debug endpoints
//!
//! - `/healthy` - Liveness: 200 `HEALTHY` or 500 `UNHEALTHY`
//! - `/ready` - Readiness: 200 `READY` or 500 `NOREADY`
//! - `/debug/{action}` - Flip a flag: `healthy`, `unhealthy`, `ready`, `noready`
//!
//! Every route accepts any method. Unknown paths and unknown debug actions
//! get a plain 404.

use crate::state::ProbeState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tracing::info;

const NOT_FOUND_BODY: &str = "404 page not found\n";

/// State change requested through `/debug/{action}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    Healthy,
    Unhealthy,
    Ready,
    NoReady,
}

impl DebugAction {
    /// Map a path segment to an action, `None` for anything unknown
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "healthy" => Some(Self::Healthy),
            "unhealthy" => Some(Self::Unhealthy),
            "ready" => Some(Self::Ready),
            "noready" => Some(Self::NoReady),
            _ => None,
        }
    }

    /// Write the flag this action targets
    pub fn apply(self, state: &ProbeState) {
        match self {
            Self::Healthy => state.set_healthy(true),
            Self::Unhealthy => state.set_healthy(false),
            Self::Ready => state.set_ready(true),
            Self::NoReady => state.set_ready(false),
        }
    }

    /// Route affected by this action and the status it will now return
    fn transition(self) -> (&'static str, u16) {
        match self {
            Self::Healthy => ("/healthy", 200),
            Self::Unhealthy => ("/healthy", 500),
            Self::Ready => ("/ready", 200),
            Self::NoReady => ("/ready", 500),
        }
    }

    fn confirmation(self) -> &'static str {
        match self {
            Self::Healthy => "Health status set to HEALTHY (200 OK)\n",
            Self::Unhealthy => "Health status set to UNHEALTHY (500 Internal Server Error)\n",
            Self::Ready => "Ready status set to READY (200 OK)\n",
            Self::NoReady => "Ready status set to NOREADY (500 Internal Server Error)\n",
        }
    }
}

/// Liveness probe handler
async fn healthy(State(state): State<ProbeState>) -> (StatusCode, &'static str) {
    if state.is_healthy() {
        (StatusCode::OK, "HEALTHY")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "UNHEALTHY")
    }
}

/// Readiness probe handler
async fn ready(State(state): State<ProbeState>) -> (StatusCode, &'static str) {
    if state.is_ready() {
        (StatusCode::OK, "READY\n")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "NOREADY\n")
    }
}

/// Debug handler
///
/// The flag is written before the response is built, so any request
/// accepted after this response sees the new value.
async fn debug(State(state): State<ProbeState>, Path(action): Path<String>) -> Response {
    let Some(action) = DebugAction::from_segment(&action) else {
        return not_found().await.into_response();
    };

    action.apply(&state);
    let (route, status) = action.transition();
    info!(
        route = route,
        status = status,
        "State changed: {} will now return {}",
        route,
        status
    );

    (StatusCode::OK, action.confirmation()).into_response()
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// Build the router for the probe and debug endpoints
pub fn build_router(state: ProbeState) -> Router {
    Router::new()
        .route("/healthy", any(healthy))
        .route("/ready", any(ready))
        .route("/debug/{action}", any(debug))
        .fallback(not_found)
        .with_state(state)
}
