// HTTP API routes: AI game-master endpoints, auth, scores, leaderboard.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::ai::{
    chat_from, difficulty_from, narration_from, prompt, ChatTurn, GameSnapshot, GatewayError,
    NexusClient, PlayerStatsSummary,
};
use crate::auth::{self, AuthUser};
use crate::db::Database;
use crate::llms_txt::LLMS_TXT;
use crate::metrics;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitScoreRequest {
    pub score: i64,
    pub level: Option<i64>,
}

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub country: Option<String>,
    pub limit: Option<i64>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub nexus: Arc<NexusClient>,
    pub http: reqwest::Client,
    pub google_client_id: Option<String>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        nexus: Arc<NexusClient>,
        google_client_id: Option<String>,
    ) -> Self {
        AppState {
            db,
            nexus,
            http: reqwest::Client::new(),
            google_client_id,
        }
    }
}

// ── Error helper ──────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": msg })))
}

fn internal_error(e: sqlx::Error) -> impl IntoResponse {
    tracing::error!("Database error: {e}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        // Game master
        .route("/api/health", get(health))
        .route("/api/narrate", post(narrate))
        .route("/api/chat", post(chat))
        .route("/api/difficulty", post(difficulty))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google", post(auth::google_login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/profile", put(auth::update_profile))
        // Scores
        .route("/api/scores", post(submit_score))
        .route("/api/leaderboard", get(leaderboard))
        // Operational
        .route("/metrics", get(get_metrics))
        .route("/llms.txt", get(get_llms_txt))
        .with_state(state)
}

// ── Game master handlers ──────────────────────────────────────────────

/// Label for the gateway outcome metric: `offline` is the standing
/// unconfigured state, `error` an attempted call that failed.
fn outcome_label(outcome: &Result<String, GatewayError>) -> &'static str {
    match outcome {
        Ok(_) => "ok",
        Err(GatewayError::Unconfigured) => "offline",
        Err(_) => "error",
    }
}

/// Run one Composer -> Gateway round trip, recording metrics.
async fn call_gateway(
    nexus: &NexusClient,
    endpoint: &str,
    instruction: &str,
    json_mode: bool,
) -> Result<String, GatewayError> {
    let started = Instant::now();
    let outcome = nexus.generate(instruction, json_mode).await;
    metrics::NEXUS_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint])
        .observe(started.elapsed().as_secs_f64());
    metrics::NEXUS_REQUESTS_TOTAL
        .with_label_values(&[endpoint, outcome_label(&outcome)])
        .inc();
    outcome
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "alive",
        "game": "SERPENT",
        "ai": state.nexus.is_configured(),
    }))
}

async fn narrate(
    State(state): State<AppState>,
    Json(snapshot): Json<GameSnapshot>,
) -> impl IntoResponse {
    let instruction = prompt::narration_prompt(&snapshot);
    let outcome = call_gateway(&state.nexus, "narrate", &instruction, true).await;
    Json(json!(narration_from(outcome)))
}

async fn chat(State(state): State<AppState>, Json(turn): Json<ChatTurn>) -> impl IntoResponse {
    let instruction = prompt::chat_prompt(&turn);
    let outcome = call_gateway(&state.nexus, "chat", &instruction, false).await;
    Json(json!(chat_from(outcome)))
}

async fn difficulty(
    State(state): State<AppState>,
    Json(stats): Json<PlayerStatsSummary>,
) -> impl IntoResponse {
    let instruction = prompt::difficulty_prompt(&stats);
    let outcome = call_gateway(&state.nexus, "difficulty", &instruction, true).await;
    Json(json!(difficulty_from(outcome)))
}

// ── Score handlers ────────────────────────────────────────────────────

async fn submit_score(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<SubmitScoreRequest>,
) -> impl IntoResponse {
    if req.score < 0 {
        return json_error(StatusCode::BAD_REQUEST, "score must be non-negative").into_response();
    }
    let level = req.level.unwrap_or(1).max(1);
    match state.db.add_score(claims.sub, req.score, level).await {
        Ok(score) => {
            metrics::SCORES_SUBMITTED_TOTAL.inc();
            (StatusCode::CREATED, Json(json!(score))).into_response()
        }
        Err(e) => internal_error(e).into_response(),
    }
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    match state.db.leaderboard(params.country.as_deref(), limit).await {
        Ok(entries) => (StatusCode::OK, Json(json!(entries))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

// ── Operational handlers ──────────────────────────────────────────────

async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

async fn get_llms_txt() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], LLMS_TXT)
}
