pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::history::handlers as history_handlers;
use crate::review::handlers as review_handlers;
use crate::state::AppState;
use crate::sync::handlers as sync_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Review pipeline
        .route("/api/v1/review", post(review_handlers::handle_review))
        .route(
            "/api/v1/review/:session_id/answer",
            post(review_handlers::handle_answer_follow_up),
        )
        .route(
            "/api/v1/review/:session_id/skip",
            post(review_handlers::handle_skip_follow_up),
        )
        // Profile sync
        .route("/api/v1/sync/suggest", get(sync_handlers::handle_suggest))
        .route("/api/v1/profile", get(sync_handlers::handle_get_profile))
        .route("/api/v1/sync", post(sync_handlers::handle_sync))
        // Review history
        .route(
            "/api/v1/history",
            get(history_handlers::handle_list_history)
                .delete(history_handlers::handle_delete_history),
        )
        .with_state(state)
}
