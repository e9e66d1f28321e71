//! HTTP API tests against the full router.
//!
//! Requests go straight to the router with `tower::ServiceExt::oneshot`;
//! each test runs its own session thread.

use std::time::Duration;

use algoviz_playback::PlaybackConfig;
use algoviz_trace::{presets, Algorithm};
use algoviz_vis::{SessionConfig, SessionHandle, VisServer};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app(speed_ms: u64) -> Router {
    let config = SessionConfig::default()
        .with_playback(PlaybackConfig::default().with_speed_ms(speed_ms));
    let session = SessionHandle::spawn(config, presets::demo(Algorithm::Kruskal))
        .expect("failed to start session");
    VisServer::new(session).router()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(path).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn status_reports_the_loaded_trace() {
    let app = test_app(500);
    let (status, body) = get_json(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["algorithm"], "kruskal");
    assert!(body["step_count"].as_u64().unwrap() > 2);

    let (status, body) = get_json(&app, "/api/algorithms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
    assert_eq!(body[3]["name"], "word_ladder");
}

#[tokio::test]
async fn step_endpoint_serves_the_current_step() {
    let app = test_app(500);
    let (status, first) = get_json(&app, "/api/step").await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["description"].is_string());
    assert_eq!(first["payload"]["kind"], "mst");

    let (status, body) =
        post_json(&app, "/api/playback/step", json!({ "direction": "forward" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cursor"], 1);
    assert_eq!(body["status"], "paused");

    // The session publishes before replying
    let (_, second) = get_json(&app, "/api/step").await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn playback_controls_round_trip() {
    let app = test_app(500);

    let (status, body) = post_json(&app, "/api/playback/play", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "playing");

    let (status, body) = post_json(&app, "/api/playback/play", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("playing"));

    let (status, body) = post_json(&app, "/api/playback/pause", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paused");

    let (status, body) = post_json(&app, "/api/playback/seek", json!({ "index": 1000 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "complete");
    assert_eq!(body["progress"], 1.0);

    let (status, body) =
        post_json(&app, "/api/playback/speed", json!({ "speed_ms": 50 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["speed_ms"], 50);

    let (status, _) = post_json(&app, "/api/playback/speed", json!({ "speed_ms": 0 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = post_json(&app, "/api/playback/reset", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cursor"], 0);
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn playback_runs_to_completion() {
    let app = test_app(1);
    let (status, _) = post_json(&app, "/api/playback/play", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let mut last = Value::Null;
    for _ in 0..500 {
        let (_, body) = get_json(&app, "/api/playback").await;
        if body["status"] == "complete" {
            last = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(last["status"], "complete");
    assert_eq!(last["cursor"].as_u64().unwrap() + 1, last["len"].as_u64().unwrap());
}

#[tokio::test]
async fn custom_traces_are_validated() {
    let app = test_app(500);

    let (status, body) = post_json(
        &app,
        "/api/trace",
        json!({
            "algorithm": "word_ladder",
            "input": { "beginWord": "hit", "endWord": "cog",
                       "wordList": ["hot", "dot", "dog", "lot", "log", "cog"] }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["algorithm"], "word_ladder");
    assert_eq!(body["generation"], 1);
    assert_eq!(body["status"]["status"], "idle");

    let (status, body) = post_json(
        &app,
        "/api/trace",
        json!({
            "algorithm": "kruskal",
            "input": { "vertices": [{ "id": 1, "x": 0.0, "y": 0.0 }],
                       "edges": [{ "source": 1, "target": 9, "weight": 2.0 }] }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains('9'));

    // A rejected trace leaves the loaded one in place
    let (_, body) = get_json(&app, "/api/status").await;
    assert_eq!(body["algorithm"], "word_ladder");

    let (status, _) = post_json(&app, "/api/trace", json!({ "algorithm": "bogosort" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn demo_traces_load_for_every_algorithm() {
    let app = test_app(500);
    for algorithm in Algorithm::ALL {
        let (status, body) =
            post_json(&app, "/api/trace", json!({ "algorithm": algorithm.name() })).await;
        assert_eq!(status, StatusCode::OK, "{}: {:?}", algorithm, body);
        assert_eq!(body["algorithm"], algorithm.name());
    }
}
