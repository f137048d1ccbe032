#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("The review service returned an empty response")]
    EmptyResponse,

    #[error("The review service returned an unparsable response: {0}")]
    UnparsableResponse(String),

    #[error("No actionable assignment: {0}")]
    NoActionableAssignment(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Profile not loaded")]
    ProfileNotLoaded,

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::EmptyInput(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_INPUT",
                msg.clone(),
            ),
            // Upstream contract violations — the review attempt is dead,
            // no partial result is ever surfaced.
            AppError::EmptyResponse => (
                StatusCode::BAD_GATEWAY,
                "EMPTY_RESPONSE",
                "The review service returned no content".to_string(),
            ),
            AppError::UnparsableResponse(msg) => {
                tracing::error!("Unparsable review response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UNPARSABLE_RESPONSE",
                    "The review service response could not be understood".to_string(),
                )
            }
            AppError::NoActionableAssignment(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_ACTIONABLE_ASSIGNMENT",
                msg.clone(),
            ),
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "A user identity is required for this operation".to_string(),
            ),
            AppError::ProfileNotLoaded => (
                StatusCode::CONFLICT,
                "PROFILE_NOT_LOADED",
                "Load the profile before applying sync assignments".to_string(),
            ),
            AppError::PersistenceFailure(msg) => {
                tracing::error!("Persistence failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILURE",
                    "Saving the profile failed; the cached profile was not modified".to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
