// Integration tests for the account and score plumbing: register, login,
// score submission, and the leaderboard ranking.

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

async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, username: &str, country: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "password": "hunter2hunter2",
            "country": country,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_me_round_trip() {
    let app = test_app().await;

    let token = register(&app, "runner1", "US").await;

    let (status, me) = request(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "runner1");
    assert_eq!(me["country"], "US");
    assert!(me.get("password_hash").is_none());

    let (status, login) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "runner1", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(login["token"].as_str().is_some());

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "runner1", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validation_and_conflicts() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "ab", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "runner1", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register(&app, "runner1", "GLOBAL").await;
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "runner1", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn scores_require_auth_and_feed_the_leaderboard() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/scores",
        None,
        Some(json!({"score": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = register(&app, "alice", "US").await;
    let bob = register(&app, "bob", "DE").await;

    for (token, score) in [(&alice, 100), (&alice, 40), (&bob, 70)] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/scores",
            Some(token),
            Some(json!({"score": score, "level": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = request(
        &app,
        "POST",
        "/api/scores",
        Some(&alice),
        Some(json!({"score": -5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, board) = request(&app, "GET", "/api/leaderboard", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["name"], "alice");
    assert_eq!(board[0]["high_score"], 100);
    assert_eq!(board[0]["total_score"], 140);

    let (status, board) = request(&app, "GET", "/api/leaderboard?country=DE", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["name"], "bob");

    // An empty country parameter ranks worldwide
    let (status, board) = request(&app, "GET", "/api/leaderboard?country=", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn profile_update_is_partial() {
    let app = test_app().await;

    let token = register(&app, "runner1", "GLOBAL").await;

    let (status, user) = request(
        &app,
        "PUT",
        "/api/auth/profile",
        Some(&token),
        Some(json!({"country": "JP"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["country"], "JP");
    assert_eq!(user["name"], "runner1");
}

#[tokio::test]
async fn google_login_unconfigured_is_unavailable() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/google",
        None,
        Some(json!({"token": "fake-id-token"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
