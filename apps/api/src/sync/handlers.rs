use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRecord;
use crate::state::AppState;
use crate::sync::classifier::suggest_field;
use crate::sync::engine::{apply_assignments, SyncAssignment, SyncReport};

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    /// The suggested profile field, or null when no keyword family matches.
    pub field: Option<&'static str>,
}

/// GET /api/v1/sync/suggest?title=...
///
/// Classifier exposure only — the suggestion is never binding. Actual sync
/// requires explicit caller-approved assignments.
pub async fn handle_suggest(
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    Ok(Json(SuggestResponse {
        field: suggest_field(&params.title).map(|f| f.as_str()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/profile?user_id=...
///
/// Loads the structured profile into the sync engine's cache and returns
/// it. A user with no stored profile gets an empty one — syncing then fills
/// it in.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<ProfileQuery>,
) -> Result<Json<ProfileRecord>, AppError> {
    let record = state
        .profiles
        .load(params.user_id)
        .await
        .map_err(AppError::Internal)?
        .unwrap_or_default();

    state.profile_cache.put(params.user_id, record.clone()).await;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub user_id: Option<Uuid>,
    pub session_id: Uuid,
    pub assignments: Vec<SyncAssignment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SyncReport,
}

/// POST /api/v1/sync
///
/// Applies caller-approved assignments from the session's latest review
/// result to the cached profile. Failures leave the cache untouched, so
/// the same request can be retried.
pub async fn handle_sync(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let result = state
        .sessions
        .with(req.session_id, |session| session.last_result.clone())
        .await
        .ok_or_else(|| AppError::NotFound(format!("Review session {} not found", req.session_id)))?
        .ok_or_else(|| {
            AppError::Validation("The session has no review result to sync from".to_string())
        })?;

    let report = apply_assignments(
        state.profiles.as_ref(),
        &state.profile_cache,
        req.user_id,
        &req.assignments,
        &result,
    )
    .await?;

    Ok(Json(SyncResponse {
        success: true,
        report,
    }))
}
