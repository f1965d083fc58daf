//! Tests for probe and debug endpoints

use super::*;
use crate::state::ProbeState;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt; // for `collect`
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

/// Send a request to the router and return status and body text
async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    call(app, Method::GET, uri).await
}

#[tokio::test]
async fn test_healthy_returns_200_on_fresh_state() {
    let app = build_router(ProbeState::new());

    let (status, body) = get(&app, "/healthy").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "HEALTHY");
}

#[tokio::test]
async fn test_ready_returns_200_with_newline_on_fresh_state() {
    let app = build_router(ProbeState::new());

    let (status, body) = get(&app, "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "READY\n");
}

#[tokio::test]
async fn test_healthy_reflects_state_without_debug_route() {
    let state = ProbeState::new();
    state.set_healthy(false);
    let app = build_router(state);

    let (status, body) = get(&app, "/healthy").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "UNHEALTHY");
}

/// /debug/unhealthy then /healthy is 500; /debug/healthy flips it back
#[tokio::test]
async fn test_debug_health_round_trip() {
    let state = ProbeState::new();
    let app = build_router(state.clone());

    let (status, body) = call(&app, Method::POST, "/debug/unhealthy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "Health status set to UNHEALTHY (500 Internal Server Error)\n"
    );

    let (status, body) = get(&app, "/healthy").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "UNHEALTHY");
    assert!(state.is_ready(), "Ready flag must not change");

    let (status, body) = get(&app, "/debug/healthy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Health status set to HEALTHY (200 OK)\n");

    let (status, body) = get(&app, "/healthy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "HEALTHY");
}

#[tokio::test]
async fn test_debug_ready_round_trip() {
    let state = ProbeState::new();
    let app = build_router(state.clone());

    let (status, body) = get(&app, "/debug/noready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "Ready status set to NOREADY (500 Internal Server Error)\n"
    );

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "NOREADY\n");
    assert!(state.is_healthy(), "Health flag must not change");

    let (status, body) = call(&app, Method::PUT, "/debug/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Ready status set to READY (200 OK)\n");

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "READY\n");
}

#[tokio::test]
async fn test_debug_unhealthy_twice_stays_unhealthy() {
    let app = build_router(ProbeState::new());

    get(&app, "/debug/unhealthy").await;
    get(&app, "/debug/unhealthy").await;

    let (status, _) = get(&app, "/healthy").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_debug_action_is_not_found_and_changes_nothing() {
    let state = ProbeState::new();
    let app = build_router(state.clone());

    let before = get(&app, "/healthy").await;

    let (status, body) = get(&app, "/debug/bogus").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 page not found\n");

    let after = get(&app, "/healthy").await;
    assert_eq!(before, after);
    assert!(state.is_healthy());
    assert!(state.is_ready());
}

#[tokio::test]
async fn test_unknown_paths_are_not_found() {
    let app = build_router(ProbeState::new());

    for uri in ["/", "/healthz", "/debug", "/debug/", "/debug/healthy/extra"] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} should be 404", uri);
    }
}

#[tokio::test]
async fn test_probes_accept_any_method() {
    let app = build_router(ProbeState::new());

    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
        let (status, body) = call(&app, method.clone(), "/healthy").await;
        assert_eq!(status, StatusCode::OK, "{} /healthy", method);
        assert_eq!(body, "HEALTHY");
    }
}

#[test]
fn test_debug_action_from_segment() {
    assert_eq!(
        DebugAction::from_segment("healthy"),
        Some(DebugAction::Healthy)
    );
    assert_eq!(
        DebugAction::from_segment("unhealthy"),
        Some(DebugAction::Unhealthy)
    );
    assert_eq!(DebugAction::from_segment("ready"), Some(DebugAction::Ready));
    assert_eq!(
        DebugAction::from_segment("noready"),
        Some(DebugAction::NoReady)
    );
    assert_eq!(DebugAction::from_segment("Healthy"), None);
    assert_eq!(DebugAction::from_segment(""), None);
}

/// Readers racing writers only ever see one of the two literal bodies
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_and_writes_never_tear() {
    let app = build_router(ProbeState::new());

    let mut readers = Vec::new();
    for _ in 0..64 {
        let app = app.clone();
        readers.push(tokio::spawn(async move {
            let mut bodies = Vec::new();
            for _ in 0..20 {
                bodies.push(get(&app, "/healthy").await);
            }
            bodies
        }));
    }

    let mut writers = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        writers.push(tokio::spawn(async move {
            for n in 0..20 {
                let uri = if (i + n) % 2 == 0 {
                    "/debug/healthy"
                } else {
                    "/debug/unhealthy"
                };
                let (status, _) = get(&app, uri).await;
                assert_eq!(status, StatusCode::OK);
            }
        }));
    }

    let all = async {
        for writer in writers {
            writer.await.unwrap();
        }
        let mut responses = Vec::new();
        for reader in readers {
            responses.extend(reader.await.unwrap());
        }
        responses
    };

    let responses = tokio::time::timeout(Duration::from_secs(10), all)
        .await
        .expect("concurrent probe traffic should not deadlock");

    assert_eq!(responses.len(), 64 * 20);
    for (status, body) in responses {
        match body.as_str() {
            "HEALTHY" => assert_eq!(status, StatusCode::OK),
            "UNHEALTHY" => assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR),
            other => panic!("unexpected /healthy body: {:?}", other),
        }
    }
}
