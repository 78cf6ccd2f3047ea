use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use serpent_backend::ai::NexusClient;
use serpent_backend::api::{self, AppState};
use serpent_backend::config::Config;
use serpent_backend::db::Database;
use serpent_backend::metrics;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to initialize database");
    let db = Arc::new(db);

    let nexus = Arc::new(NexusClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    if nexus.is_configured() {
        tracing::info!("NEXUS gateway configured (model: {})", config.gemini_model);
    } else {
        tracing::info!("No GEMINI_API_KEY set; AI endpoints serve static fallbacks");
    }

    let state = AppState::new(db, nexus, config.google_client_id.clone());
    let mut app = api::router(state).layer(CorsLayer::permissive());

    // Serve the built frontend, falling back to index.html for SPA routes.
    if let Some(ref static_dir) = config.static_dir {
        let index = ServeFile::new(static_dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(static_dir).fallback(index));
        tracing::info!("Serving static files from {}", static_dir.display());
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("SERPENT backend listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
