// Integration tests for the AI endpoints with an unconfigured gateway:
// every request must get a 200 with the documented static fallback.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use serpent_backend::ai::NexusClient;
use serpent_backend::api::{self, AppState};
use serpent_backend::db::Database;

async fn test_app() -> Router {
    let db = Arc::new(Database::new("sqlite::memory:").await.unwrap());
    let nexus = Arc::new(NexusClient::new(None, "gemini-2.0-flash".to_string()));
    api::router(AppState::new(db, nexus, None))
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_ai_unconfigured() {
    let app = test_app().await;

    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
    assert_eq!(body["game"], "SERPENT");
    assert_eq!(body["ai"], false);
}

#[tokio::test]
async fn narrate_offline_fallback_is_exact() {
    let app = test_app().await;

    let (status, body) = post_json(&app, "/api/narrate", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "narration": "The Serpent slithers onward through the neon void...",
            "event": null
        })
    );

    // Snapshot contents make no difference to the offline fallback
    let full = json!({
        "score": 120, "length": 25, "level": 4, "deaths": 1,
        "active_powerups": ["shield"], "recent_events": ["ate food"],
        "time_alive": 93.5
    });
    let (status, body) = post_json(&app, "/api/narrate", full).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["narration"],
        "The Serpent slithers onward through the neon void..."
    );
    assert_eq!(body["event"], Value::Null);
}

#[tokio::test]
async fn chat_offline_fallback_is_exact() {
    let app = test_app().await;

    let (status, body) =
        post_json(&app, "/api/chat", json!({"message": "give me a hint"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"reply": "NEXUS is offline. The Serpent is on its own, Runner."})
    );
}

#[tokio::test]
async fn difficulty_offline_fallback_is_exact() {
    let app = test_app().await;

    let (status, body) = post_json(&app, "/api/difficulty", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["speed"], 7.0);
    assert_eq!(body["obstacle_density"], 0.3);
    assert_eq!(body["powerup_frequency"], 0.5);
    assert_eq!(body["commentary"], "Default parameters engaged.");
}

#[tokio::test]
async fn malformed_snapshot_is_a_client_error() {
    let app = test_app().await;

    let (status, _) = post_json(&app, "/api/narrate", json!({"score": "not a number"})).await;
    assert!(status.is_client_error(), "got {status}");

    // Chat requires a message field
    let (status, _) = post_json(&app, "/api/chat", json!({})).await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn llms_txt_describes_the_api() {
    let app = test_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/llms.txt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("SERPENT API"));
    assert!(text.contains("/api/narrate"));
}

#[tokio::test]
async fn metrics_endpoint_serves_exposition_format() {
    let app = test_app().await;

    // Drive one AI request so at least one counter exists
    let _ = post_json(&app, "/api/narrate", json!({})).await;

    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
