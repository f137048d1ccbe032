use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::ReviewLogRow;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

/// GET /api/v1/history?user_id=&limit=
///
/// Cancellable retrieval: starting a new retrieval for the same viewer
/// cancels the outstanding one, and the cancelled request's result is
/// discarded rather than returned to a stale viewing context.
pub async fn handle_list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ReviewLogRow>>, AppError> {
    let token = state.history_views.begin(params.user_id);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100);

    tokio::select! {
        _ = token.cancelled() => Err(AppError::Conflict(
            "History retrieval superseded by a newer request".to_string(),
        )),
        rows = state.history.list(params.user_id, limit) => {
            Ok(Json(rows.map_err(AppError::Internal)?))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryDeleteQuery {
    pub user_id: Uuid,
    /// Omitting the entry id clears every entry for the identity.
    pub entry_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HistoryDeleteResponse {
    pub removed: u64,
}

/// DELETE /api/v1/history?user_id=&entry_id=
pub async fn handle_delete_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryDeleteQuery>,
) -> Result<Json<HistoryDeleteResponse>, AppError> {
    let removed = state
        .history
        .delete(params.user_id, params.entry_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(HistoryDeleteResponse { removed }))
}
