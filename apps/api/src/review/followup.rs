#![allow(dead_code)]

//! Follow-Up Loop Controller — tracks which clarification questions are
//! pending/answered/skipped for a review session.
//!
//! The state machine is a plain object with pure transitions (`answer`,
//! `skip`, `absorb_result`) so it can be unit-tested without the HTTP
//! layer. Answering a follow-up is not a local edit: the handler re-invokes
//! the full review with the updated sections afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::review::models::{
    AnsweredFollowUp, FollowUpQuestion, ReviewResult, Section, StyleOptions,
};

/// Sentinel recorded for a skipped question: the user deferred, the question
/// is no longer pending, and no section text was touched.
pub const SKIP_SENTINEL: &str = "（この質問への回答は見送られました）";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpState {
    Idle,
    AwaitingAnswers,
}

/// Outcome of an `answer` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer was appended to a section; a re-review is required.
    Applied,
    /// Blank answer — no-op, the question stays pending.
    BlankAnswer,
    /// No pending question with that id.
    UnknownQuestion,
}

/// One review session: the sanitized sections, the style contract, and the
/// follow-up question lifecycle. Discarded when the caller starts a new
/// top-level review.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub sections: Vec<Section>,
    pub options: StyleOptions,
    pub company_context: Option<String>,
    pub pending: Vec<FollowUpQuestion>,
    pub answered: Vec<AnsweredFollowUp>,
    pub last_result: Option<ReviewResult>,
    /// Single-flight gate: a new round-trip is rejected while one is
    /// outstanding for this session.
    pub in_flight: bool,
}

impl ReviewSession {
    pub fn new(
        user_id: Option<Uuid>,
        sections: Vec<Section>,
        options: StyleOptions,
        company_context: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            sections,
            options,
            company_context,
            pending: Vec::new(),
            answered: Vec::new(),
            last_result: None,
            in_flight: false,
        }
    }

    pub fn state(&self) -> FollowUpState {
        if self.pending.is_empty() {
            FollowUpState::Idle
        } else {
            FollowUpState::AwaitingAnswers
        }
    }

    /// Absorbs a fresh review result: stores it and replaces the pending set
    /// with the result's follow-up questions. Ids already answered or
    /// skipped are filtered out — the prompt asks the service not to re-ask
    /// them, but that is best-effort only.
    pub fn absorb_result(&mut self, result: ReviewResult) {
        self.pending = result
            .follow_up_questions
            .clone()
            .unwrap_or_default()
            .into_iter()
            .filter(|q| !self.answered.iter().any(|a| a.id == q.id))
            .collect();
        self.last_result = Some(result);
    }

    /// Applies an answer to a pending question: appends
    /// `\n\n【追記 ({id})】{text}` to the question's target section (the
    /// first section when `section_id` does not resolve), records the
    /// answer, and removes the question from the pending set.
    ///
    /// A blank answer is a no-op that leaves the question pending.
    pub fn answer(&mut self, question_id: &str, answer: &str) -> AnswerOutcome {
        let Some(position) = self.pending.iter().position(|q| q.id == question_id) else {
            return AnswerOutcome::UnknownQuestion;
        };

        let answer = answer.trim();
        if answer.is_empty() {
            return AnswerOutcome::BlankAnswer;
        }

        let question = self.pending.remove(position);
        let target = question
            .section_id
            .as_deref()
            .and_then(|id| self.sections.iter().position(|s| s.id == id))
            .unwrap_or(0);
        if let Some(section) = self.sections.get_mut(target) {
            section.text = format!("{}\n\n【追記 ({})】{}", section.text, question.id, answer);
        }

        self.answered.push(AnsweredFollowUp {
            id: question.id,
            answer: answer.to_string(),
        });
        AnswerOutcome::Applied
    }

    /// Claims the single-flight gate for a new round-trip. Returns false
    /// when one is already outstanding for this session.
    pub fn begin_flight(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Releases the single-flight gate, success or failure.
    pub fn end_flight(&mut self) {
        self.in_flight = false;
    }

    /// Skips a pending question: records the deferral sentinel and removes
    /// it from the pending set without mutating any section text or
    /// triggering a re-review. Returns false for an unknown id.
    pub fn skip(&mut self, question_id: &str) -> bool {
        let Some(position) = self.pending.iter().position(|q| q.id == question_id) else {
            return false;
        };
        let question = self.pending.remove(position);
        self.answered.push(AnsweredFollowUp {
            id: question.id,
            answer: SKIP_SENTINEL.to_string(),
        });
        true
    }
}

/// In-memory registry of live review sessions, keyed by session id.
/// Sessions are private to their caller; there is no cross-session state.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, ReviewSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: ReviewSession) {
        self.inner.lock().await.insert(session.id, session);
    }

    /// Runs `f` against the named session under the registry lock.
    /// Returns `None` when the session does not exist.
    pub async fn with<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ReviewSession) -> R,
    ) -> Option<R> {
        self.inner.lock().await.get_mut(&id).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::models::{Audience, Honorific, Language, Tone, WritingStyle};

    fn options() -> StyleOptions {
        StyleOptions {
            tone: Tone::Keigo,
            writing_style: WritingStyle::Neutral,
            honorific: Honorific::Standard,
            audience: Audience::External,
            language: Language::Ja,
        }
    }

    fn session_with_questions() -> ReviewSession {
        let mut session = ReviewSession::new(
            None,
            vec![
                Section {
                    id: "s1".to_string(),
                    title: "自己紹介".to_string(),
                    text: "私はエンジニアです。".to_string(),
                },
                Section {
                    id: "s2".to_string(),
                    title: "経験".to_string(),
                    text: "5年間開発をしています。".to_string(),
                },
            ],
            options(),
            None,
        );
        session.absorb_result(ReviewResult {
            overall_summary: "ok".to_string(),
            overall_score: None,
            sections: vec![],
            suggestions: vec![],
            style_compliance: None,
            follow_up_questions: Some(vec![
                FollowUpQuestion {
                    id: "q1".to_string(),
                    section_id: Some("s2".to_string()),
                    question: "チーム規模は？".to_string(),
                    reason: None,
                    missing_info_hint: None,
                },
                FollowUpQuestion {
                    id: "q2".to_string(),
                    section_id: Some("no-such-section".to_string()),
                    question: "期間は？".to_string(),
                    reason: None,
                    missing_info_hint: None,
                },
            ]),
        });
        session
    }

    #[test]
    fn test_state_transitions_idle_to_awaiting() {
        let mut session = session_with_questions();
        assert_eq!(session.state(), FollowUpState::AwaitingAnswers);
        session.answer("q1", "5名です");
        session.skip("q2");
        assert_eq!(session.state(), FollowUpState::Idle);
    }

    #[test]
    fn test_answer_appends_to_target_section() {
        let mut session = session_with_questions();
        assert_eq!(session.answer("q1", "5名です"), AnswerOutcome::Applied);
        assert!(session.sections[1]
            .text
            .ends_with("\n\n【追記 (q1)】5名です"));
        // Untargeted section untouched.
        assert_eq!(session.sections[0].text, "私はエンジニアです。");
        assert_eq!(session.answered.len(), 1);
        assert_eq!(session.pending.len(), 1);
    }

    #[test]
    fn test_answer_falls_back_to_first_section() {
        let mut session = session_with_questions();
        assert_eq!(session.answer("q2", "3ヶ月です"), AnswerOutcome::Applied);
        assert!(session.sections[0].text.contains("【追記 (q2)】3ヶ月です"));
    }

    #[test]
    fn test_blank_answer_is_noop_and_stays_pending() {
        let mut session = session_with_questions();
        let before = session.sections.clone();
        assert_eq!(session.answer("q1", "   "), AnswerOutcome::BlankAnswer);
        assert_eq!(session.sections, before);
        assert_eq!(session.pending.len(), 2);
        assert!(session.answered.is_empty());
    }

    #[test]
    fn test_answer_unknown_question() {
        let mut session = session_with_questions();
        assert_eq!(
            session.answer("nope", "answer"),
            AnswerOutcome::UnknownQuestion
        );
    }

    #[test]
    fn test_skip_records_sentinel_without_touching_sections() {
        let mut session = session_with_questions();
        let before = session.sections.clone();
        assert!(session.skip("q1"));
        assert_eq!(session.sections, before);
        assert_eq!(session.pending.len(), 1);
        assert_eq!(session.answered[0].id, "q1");
        assert_eq!(session.answered[0].answer, SKIP_SENTINEL);
    }

    #[test]
    fn test_skip_unknown_question_is_rejected() {
        let mut session = session_with_questions();
        assert!(!session.skip("nope"));
        assert_eq!(session.pending.len(), 2);
    }

    #[test]
    fn test_absorb_result_filters_already_answered_ids() {
        let mut session = session_with_questions();
        session.answer("q1", "5名です");

        // A later round re-asks q1 plus a new question.
        session.absorb_result(ReviewResult {
            overall_summary: "round 2".to_string(),
            overall_score: None,
            sections: vec![],
            suggestions: vec![],
            style_compliance: None,
            follow_up_questions: Some(vec![
                FollowUpQuestion {
                    id: "q1".to_string(),
                    section_id: None,
                    question: "チーム規模は？".to_string(),
                    reason: None,
                    missing_info_hint: None,
                },
                FollowUpQuestion {
                    id: "q3".to_string(),
                    section_id: None,
                    question: "成果は？".to_string(),
                    reason: None,
                    missing_info_hint: None,
                },
            ]),
        });

        assert_eq!(session.pending.len(), 1);
        assert_eq!(session.pending[0].id, "q3");
    }

    #[test]
    fn test_absorb_result_with_no_questions_goes_idle() {
        let mut session = session_with_questions();
        session.absorb_result(ReviewResult {
            overall_summary: "done".to_string(),
            overall_score: Some(90),
            sections: vec![],
            suggestions: vec![],
            style_compliance: None,
            follow_up_questions: None,
        });
        assert_eq!(session.state(), FollowUpState::Idle);
        assert!(session.pending.is_empty());
    }

    #[test]
    fn test_single_flight_gate_rejects_second_claim() {
        let mut session = session_with_questions();
        assert!(session.begin_flight());
        assert!(!session.begin_flight());
        session.end_flight();
        assert!(session.begin_flight());
    }

    #[tokio::test]
    async fn test_registry_with_unknown_session_returns_none() {
        let registry = SessionRegistry::new();
        let touched = registry.with(Uuid::new_v4(), |_| ()).await;
        assert!(touched.is_none());
    }

    #[tokio::test]
    async fn test_registry_insert_and_mutate() {
        let registry = SessionRegistry::new();
        let session = session_with_questions();
        let id = session.id;
        registry.insert(session).await;

        let outcome = registry.with(id, |s| s.answer("q1", "5名です")).await;
        assert_eq!(outcome, Some(AnswerOutcome::Applied));
        let pending = registry.with(id, |s| s.pending.len()).await;
        assert_eq!(pending, Some(1));
    }
}
