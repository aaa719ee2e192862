//! mathsolver HTTP Server
//!
//! Axum-based server providing the chat API, a WebSocket event stream,
//! and the static page.

mod config;
mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mathsolver_core::{GenerationOptions, SessionStore};
use mathsolver_tools::encyclopedia::WikipediaClient;

use crate::config::ServerConfig;
use crate::handlers::{
    chat_handler, chat_stream_handler, create_session, delete_session, get_session, health_check,
};
use crate::state::{AppState, GroqFactory};

/// Routes, layers and the static fallback
pub fn router(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Sessions
        .route("/api/session", post(create_session))
        .route("/api/session/{id}", get(get_session).delete(delete_session))
        // Agent API
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        // Static files (WASM frontend)
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically discard sessions nobody has touched for `idle_secs`
fn spawn_session_reaper(sessions: Arc<SessionStore>, idle_secs: u64) {
    let max_idle = Duration::from_secs(idle_secs);
    let period = Duration::from_secs(idle_secs.clamp(1, 60));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            sessions.evict_idle(max_idle).await;
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let encyclopedia = WikipediaClient::new(config.wikipedia.clone())?;
    tracing::info!(
        "✓ Encyclopedia: {} ({})",
        config.wikipedia.lang,
        config.wikipedia.top_k_results
    );
    tracing::info!("✓ Model: {} via {}", config.model, config.groq.base_url);

    let state = AppState {
        sessions: Arc::new(SessionStore::new()),
        providers: Arc::new(GroqFactory::new(config.groq.clone())),
        encyclopedia: Arc::new(encyclopedia),
        generation: GenerationOptions {
            model: config.model.clone(),
            ..GenerationOptions::default()
        },
        max_iterations: config.max_iterations,
    };

    spawn_session_reaper(Arc::clone(&state.sessions), config.session_idle_secs);

    let app = router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 mathsolver server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  POST /api/session       - Start a session");
    tracing::info!("  GET  /api/session/{{id}}  - Render a transcript");
    tracing::info!("  DEL  /api/session/{{id}}  - End a session");
    tracing::info!("  POST /api/chat          - Ask a question");
    tracing::info!("  GET  /api/chat/stream   - WebSocket streaming");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
