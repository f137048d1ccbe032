use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::review::engine::{record_history, run_review, ReviewRequest, ReviewResponse};
use crate::review::followup::{AnswerOutcome, ReviewSession};
use crate::review::models::{AnsweredFollowUp, FollowUpQuestion, Section, StyleOptions};
use crate::review::sanitize::sanitize_sections;
use crate::state::AppState;

/// POST /api/v1/review
///
/// Runs a fresh top-level review and opens a new session. Any previous
/// session for the caller is simply abandoned — sessions are discarded, not
/// resumed, when a new review starts.
pub async fn handle_review(
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let sections = sanitize_sections(&req.sections);
    if sections.is_empty() {
        return Err(AppError::EmptyInput(
            "セクションが空です。本文を入力してから実行してください。".to_string(),
        ));
    }

    let mut session = ReviewSession::new(
        req.user_id,
        sections,
        req.style,
        req.company_context.clone(),
    );

    let result = run_review(
        state.llm.as_ref(),
        &session.sections,
        &session.options,
        session.company_context.as_deref(),
        &[],
    )
    .await?;

    record_history(&state.history, session.user_id, &result).await;
    session.absorb_result(result.clone());

    let session_id = session.id;
    state.sessions.insert(session).await;

    Ok(Json(ReviewResponse { session_id, result }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: String,
    pub answer: String,
}

/// POST /api/v1/review/:session_id/answer
///
/// Applies an answer to a pending follow-up question and re-invokes the
/// full review with the updated sections. Single-flight: rejected while a
/// round-trip for this session is outstanding.
pub async fn handle_answer_follow_up(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    enum Prep {
        Rerun {
            sections: Vec<Section>,
            options: StyleOptions,
            company_context: Option<String>,
            answered: Vec<AnsweredFollowUp>,
        },
        Blank,
        Unknown,
    }

    let prep = state
        .sessions
        .with(session_id, |session| {
            if session.in_flight {
                return Err(AppError::Conflict(
                    "A review for this session is already in flight".to_string(),
                ));
            }
            match session.answer(&req.question_id, &req.answer) {
                AnswerOutcome::Applied => {
                    session.begin_flight();
                    Ok(Prep::Rerun {
                        sections: session.sections.clone(),
                        options: session.options,
                        company_context: session.company_context.clone(),
                        answered: session.answered.clone(),
                    })
                }
                AnswerOutcome::BlankAnswer => Ok(Prep::Blank),
                AnswerOutcome::UnknownQuestion => Ok(Prep::Unknown),
            }
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("Review session {session_id} not found")))??;

    let (sections, options, company_context, answered) = match prep {
        Prep::Rerun {
            sections,
            options,
            company_context,
            answered,
        } => (sections, options, company_context, answered),
        Prep::Blank => {
            // Blank answer is a no-op; return the current state unchanged.
            let result = state
                .sessions
                .with(session_id, |s| s.last_result.clone())
                .await
                .flatten()
                .ok_or_else(|| AppError::NotFound("No review result in session".to_string()))?;
            return Ok(Json(ReviewResponse { session_id, result }));
        }
        Prep::Unknown => {
            return Err(AppError::NotFound(format!(
                "Question '{}' is not pending in this session",
                req.question_id
            )))
        }
    };

    let outcome = run_review(
        state.llm.as_ref(),
        &sections,
        &options,
        company_context.as_deref(),
        &answered,
    )
    .await;

    // Always release the single-flight gate, even when the re-review failed.
    state.sessions.with(session_id, |s| s.end_flight()).await;

    let result = outcome?;
    let user_id = state
        .sessions
        .with(session_id, |s| {
            s.absorb_result(result.clone());
            s.user_id
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("Review session {session_id} not found")))?;

    record_history(&state.history, user_id, &result).await;

    Ok(Json(ReviewResponse { session_id, result }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRequest {
    pub question_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipResponse {
    pub pending: Vec<FollowUpQuestion>,
}

/// POST /api/v1/review/:session_id/skip
///
/// Records the deferral sentinel for a pending question. No section text is
/// touched and no re-review is triggered.
pub async fn handle_skip_follow_up(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SkipRequest>,
) -> Result<Json<SkipResponse>, AppError> {
    let pending = state
        .sessions
        .with(session_id, |session| {
            if session.skip(&req.question_id) {
                Ok(session.pending.clone())
            } else {
                Err(AppError::NotFound(format!(
                    "Question '{}' is not pending in this session",
                    req.question_id
                )))
            }
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("Review session {session_id} not found")))??;

    Ok(Json(SkipResponse { pending }))
}
