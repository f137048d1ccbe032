//! Review orchestration — one full round-trip of the pipeline.
//!
//! Flow: sanitize → compose style directives + prompt → generation service
//! → contract parser → best-effort history append.
//!
//! The same entry point serves the initial review and every follow-up
//! re-review; answering a clarification question is a new round-trip, not a
//! local edit.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::{HistoryRecorder, NewReviewLog};
use crate::llm_client::GenerationService;
use crate::review::models::{
    AnsweredFollowUp, RawSection, ReviewResult, Section, StyleOptions,
};
use crate::review::parser::{parse_review_response, ParseError};
use crate::review::style::compose_review_prompt;

/// Request body for a top-level review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user_id: Option<Uuid>,
    pub sections: Vec<RawSection>,
    #[serde(flatten)]
    pub style: StyleOptions,
    pub company_context: Option<String>,
}

/// Response envelope: the validated result plus the session handle the
/// caller uses for the follow-up loop and sync.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub session_id: Uuid,
    pub result: ReviewResult,
}

/// Runs one review round-trip over already-sanitized sections.
///
/// Transport failures surface as `AppError::Llm`; content-level contract
/// violations surface as `EmptyResponse`/`UnparsableResponse` and kill the
/// attempt — no partial result is ever produced.
pub async fn run_review(
    llm: &dyn GenerationService,
    sections: &[Section],
    options: &StyleOptions,
    company_context: Option<&str>,
    answered_follow_ups: &[AnsweredFollowUp],
) -> Result<ReviewResult, AppError> {
    let prompt = compose_review_prompt(sections, options, company_context, answered_follow_ups)
        .map_err(AppError::Internal)?;

    info!(
        "Requesting review of {} section(s) ({} answered follow-up(s) in context)",
        sections.len(),
        answered_follow_ups.len()
    );

    let raw = llm
        .generate(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Review generation call failed: {e}")))?;

    let result = parse_review_response(&raw, sections).map_err(|e| match e {
        ParseError::EmptyResponse => AppError::EmptyResponse,
        ParseError::UnparsableResponse => {
            AppError::UnparsableResponse(raw.chars().take(200).collect())
        }
    })?;

    info!(
        "Review parsed: {} section feedback(s), {} follow-up question(s)",
        result.sections.len(),
        result
            .follow_up_questions
            .as_ref()
            .map(Vec::len)
            .unwrap_or(0)
    );

    Ok(result)
}

/// Appends the result to the caller's review history. Best-effort: the
/// result is already in hand, so a log failure only degrades durability.
pub async fn record_history(
    history: &HistoryRecorder,
    user_id: Option<Uuid>,
    result: &ReviewResult,
) {
    let Some(user_id) = user_id else {
        return; // anonymous reviews are not logged
    };
    match NewReviewLog::from_result(user_id, result) {
        Ok(entry) => history.record(entry).await,
        Err(e) => warn!("Could not serialize review result for history: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::review::models::{Audience, Honorific, Language, Tone, WritingStyle};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted generation service: returns canned responses in order and
    /// records the prompts it was given.
    struct ScriptedService {
        responses: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().map(String::from).collect()),
                prompts: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedService {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or(LlmError::EmptyContent)
        }
    }

    fn options() -> StyleOptions {
        StyleOptions {
            tone: Tone::Keigo,
            writing_style: WritingStyle::Neutral,
            honorific: Honorific::Standard,
            audience: Audience::External,
            language: Language::Ja,
        }
    }

    fn sections() -> Vec<Section> {
        vec![Section {
            id: "s1".to_string(),
            title: "経験".to_string(),
            text: "5年間開発をしています。".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_run_review_happy_path() {
        let service = ScriptedService::new(vec![
            r#"{"overallSummary":"良いです","overallScore":75,"sections":[{"sectionId":"s1","summary":"明確","score":80,"revisedText":"5年間、Webサービスの開発をしています。","categories":[]}]}"#,
        ]);
        let result = run_review(&service, &sections(), &options(), None, &[])
            .await
            .unwrap();
        assert_eq!(result.overall_score, Some(75));
        assert_eq!(result.sections.len(), 1);
        assert_eq!(
            result.sections[0].revised_text,
            "5年間、Webサービスの開発をしています。"
        );
    }

    #[tokio::test]
    async fn test_run_review_prompt_carries_sections_and_answers() {
        let service = ScriptedService::new(vec![r#"{"overallSummary":"ok","sections":[]}"#]);
        let answered = vec![AnsweredFollowUp {
            id: "q1".to_string(),
            answer: "5名".to_string(),
        }];
        run_review(&service, &sections(), &options(), Some("toB SaaS"), &answered)
            .await
            .unwrap();

        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[0].contains("5年間開発をしています。"));
        assert!(prompts[0].contains("toB SaaS"));
        assert!(prompts[0].contains("(q1) 5名"));
    }

    #[tokio::test]
    async fn test_run_review_empty_response_is_fatal() {
        let service = ScriptedService::new(vec!["   "]);
        let err = run_review(&service, &sections(), &options(), None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_run_review_garbage_response_is_fatal() {
        let service = ScriptedService::new(vec!["I cannot do that."]);
        let err = run_review(&service, &sections(), &options(), None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnparsableResponse(_)));
    }

    #[tokio::test]
    async fn test_run_review_transport_failure_maps_to_llm_error() {
        let service = ScriptedService::new(vec![]);
        let err = run_review(&service, &sections(), &options(), None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
