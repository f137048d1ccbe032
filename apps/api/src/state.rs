use std::sync::Arc;

use sqlx::PgPool;

use crate::history::{HistoryRecorder, HistoryViews};
use crate::llm_client::GenerationService;
use crate::review::followup::SessionRegistry;
use crate::sync::engine::ProfileCache;
use crate::sync::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Shared pool. Feature code queries through the typed stores, which
    /// hold their own clones.
    #[allow(dead_code)]
    pub db: PgPool,
    /// The text-generation collaborator. Trait object so tests can swap in a
    /// scripted fake without touching handler code.
    pub llm: Arc<dyn GenerationService>,
    pub profiles: Arc<dyn ProfileStore>,
    /// Per-identity cached profile, mutated only through the sync engine's
    /// copy-on-write commit.
    pub profile_cache: ProfileCache,
    pub history: HistoryRecorder,
    /// Per-viewer cancellation registry for history retrievals.
    pub history_views: HistoryViews,
    /// Live review sessions (follow-up loop state).
    pub sessions: SessionRegistry,
}
