mod config;
mod db;
mod errors;
mod history;
mod llm_client;
mod models;
mod review;
mod routes;
mod state;
mod sync;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::history::{HistoryRecorder, HistoryViews, PgHistoryStore};
use crate::llm_client::LlmClient;
use crate::review::followup::SessionRegistry;
use crate::routes::build_router;
use crate::state::AppState;
use crate::sync::engine::ProfileCache;
use crate::sync::store::PgProfileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Migaki API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Persistence collaborators
    let profiles = Arc::new(PgProfileStore::new(db.clone()));
    let history = HistoryRecorder::new(Arc::new(PgHistoryStore::new(db.clone())));

    // Build app state
    let state = AppState {
        db,
        llm: Arc::new(llm),
        profiles,
        profile_cache: ProfileCache::new(),
        history,
        history_views: HistoryViews::new(),
        sessions: SessionRegistry::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
