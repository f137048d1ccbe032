//! Response Contract Parser — the primary trust boundary of the pipeline.
//!
//! The generation service returns loosely-structured text. Every field is
//! treated as adversarial/malformed until validated: the raw response is
//! decoded into `serde_json::Value` and normalized entity-by-entity with
//! explicit fallbacks. A parsing failure is fatal to the review attempt;
//! no partial or garbled result is ever returned.

use serde_json::Value;
use thiserror::Error;

use crate::review::models::{
    CategoryFeedback, CategoryId, FollowUpQuestion, Priority, ReviewResult, Section,
    SectionFeedback, StyleCompliance,
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response was empty")]
    EmptyResponse,

    #[error("no decodable JSON object found in response")]
    UnparsableResponse,
}

/// Parses and validates a raw generation-service response against the
/// sanitized sections it was produced for.
///
/// Decode order: trim → strip markdown fences → direct decode → first
/// balanced `{...}` span. Anything less yields `UnparsableResponse`.
pub fn parse_review_response(
    raw: &str,
    sections: &[Section],
) -> Result<ReviewResult, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let value = decode_json(trimmed).ok_or(ParseError::UnparsableResponse)?;
    if !value.is_object() {
        return Err(ParseError::UnparsableResponse);
    }

    Ok(normalize_review(&value, sections))
}

// ────────────────────────────────────────────────────────────────────────────
// JSON extraction
// ────────────────────────────────────────────────────────────────────────────

fn decode_json(text: &str) -> Option<Value> {
    let unfenced = strip_json_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return Some(value);
    }
    let span = balanced_object_span(unfenced)?;
    serde_json::from_str::<Value>(span).ok()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the first balanced `{...}` span, tracking string literals and
/// escapes so braces inside values do not break the balance count.
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Field-level normalization helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads a string field, trimmed; missing or non-string becomes `""`.
fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Reads an optional string field; blank collapses to `None`.
fn opt_string_field(value: &Value, key: &str) -> Option<String> {
    Some(string_field(value, key)).filter(|s| !s.is_empty())
}

/// Clamps a score value to `[0, 100]` with rounding. Non-numeric or
/// non-finite input is dropped to `None` — "not evaluated" is a distinct
/// state and must never collapse to a zero score. Numeric strings are
/// accepted because models routinely quote numbers.
fn clamp_score(value: Option<&Value>) -> Option<u8> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}

// ────────────────────────────────────────────────────────────────────────────
// Entity normalization — one function per entity
// ────────────────────────────────────────────────────────────────────────────

fn normalize_review(value: &Value, sections: &[Section]) -> ReviewResult {
    let section_feedbacks = value
        .get("sections")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| normalize_section_feedback(entry, index, sections))
                .collect()
        })
        .unwrap_or_default();

    let suggestions = value
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let follow_up_questions = value
        .get("followUpQuestions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| normalize_follow_up(entry, index))
                .collect::<Vec<_>>()
        })
        // Absence, not an empty list, signals "no follow-up needed".
        .filter(|questions: &Vec<FollowUpQuestion>| !questions.is_empty());

    ReviewResult {
        overall_summary: string_field(value, "overallSummary"),
        overall_score: clamp_score(value.get("overallScore")),
        sections: section_feedbacks,
        suggestions,
        style_compliance: normalize_style_compliance(value.get("styleCompliance")),
        follow_up_questions,
    }
}

/// Normalizes one section-feedback entry. Resolution back to an input
/// section goes by id first, then by array position; feedback that resolves
/// to no input section at all is discarded as garbage.
fn normalize_section_feedback(
    value: &Value,
    index: usize,
    sections: &[Section],
) -> Option<SectionFeedback> {
    let claimed_id = opt_string_field(value, "sectionId");
    let matched = claimed_id
        .as_deref()
        .and_then(|id| sections.iter().find(|s| s.id == id))
        .or_else(|| sections.get(index))?;

    let revised_text = opt_string_field(value, "revisedText")
        // The pipeline never returns an empty revision.
        .unwrap_or_else(|| matched.text.clone());

    let categories = value
        .get("categories")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(normalize_category).collect())
        .unwrap_or_default();

    Some(SectionFeedback {
        section_id: matched.id.clone(),
        section_title: matched.title.clone(),
        summary: string_field(value, "summary"),
        score: clamp_score(value.get("score")),
        revised_text,
        categories,
    })
}

/// Normalizes one category entry. The id goes through the synonym table and
/// the label is re-derived from the normalized id; entries with neither a
/// comment nor a suggestion carry no information and are dropped.
fn normalize_category(value: &Value) -> Option<CategoryFeedback> {
    let comment = string_field(value, "comment");
    let suggestion = string_field(value, "suggestion");
    if comment.is_empty() && suggestion.is_empty() {
        return None;
    }

    let id = CategoryId::from_raw(&string_field(value, "id"));
    let priority = Priority::from_raw(&string_field(value, "priority"));

    Some(CategoryFeedback {
        id,
        label: id.label().to_string(),
        comment,
        suggestion,
        example: opt_string_field(value, "example"),
        priority,
    })
}

/// Normalizes one follow-up question; entries without a non-empty question
/// are discarded. A missing id gets a positional fallback.
fn normalize_follow_up(value: &Value, index: usize) -> Option<FollowUpQuestion> {
    let question = opt_string_field(value, "question")?;
    let id = opt_string_field(value, "id").unwrap_or_else(|| format!("question-{}", index + 1));

    Some(FollowUpQuestion {
        id,
        section_id: opt_string_field(value, "sectionId"),
        question,
        reason: opt_string_field(value, "reason"),
        missing_info_hint: opt_string_field(value, "missingInfoHint"),
    })
}

fn normalize_style_compliance(value: Option<&Value>) -> Option<StyleCompliance> {
    let value = value?;
    let matched = match value.get("matched") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => return None,
    };
    Some(StyleCompliance {
        matched,
        notes: opt_string_field(value, "notes"),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sections() -> Vec<Section> {
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
        ]
    }

    #[test]
    fn test_empty_response_fails() {
        assert!(matches!(
            parse_review_response("   \n ", &sections()),
            Err(ParseError::EmptyResponse)
        ));
    }

    #[test]
    fn test_garbage_response_fails() {
        assert!(matches!(
            parse_review_response("ごめんなさい、できませんでした。", &sections()),
            Err(ParseError::UnparsableResponse)
        ));
    }

    #[test]
    fn test_bare_array_is_not_a_review_object() {
        assert!(matches!(
            parse_review_response("[1, 2, 3]", &sections()),
            Err(ParseError::UnparsableResponse)
        ));
    }

    #[test]
    fn test_direct_decode() {
        let raw = json!({
            "overallSummary": "良い内容です。",
            "overallScore": 81,
            "sections": []
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.overall_summary, "良い内容です。");
        assert_eq!(result.overall_score, Some(81));
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_wrapped_response_falls_back_to_span_extraction() {
        let raw = "Sure! Here is the result: {\"overallSummary\":\"ok\",\"sections\":[]} Thanks.";
        let result = parse_review_response(raw, &sections()).unwrap();
        assert_eq!(result.overall_summary, "ok");
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_fenced_response_decodes() {
        let raw = "```json\n{\"overallSummary\":\"ok\",\"sections\":[]}\n```";
        let result = parse_review_response(raw, &sections()).unwrap();
        assert_eq!(result.overall_summary, "ok");
    }

    #[test]
    fn test_span_extraction_survives_braces_inside_strings() {
        let raw = r#"prefix {"overallSummary":"uses {braces} and \"quotes\"","sections":[]} suffix"#;
        let result = parse_review_response(raw, &sections()).unwrap();
        assert_eq!(result.overall_summary, r#"uses {braces} and "quotes""#);
    }

    #[test]
    fn test_span_extraction_handles_nested_objects() {
        let raw = r#"noise {"overallSummary":"ok","styleCompliance":{"matched":true},"sections":[]} noise"#;
        let result = parse_review_response(raw, &sections()).unwrap();
        assert!(result.style_compliance.unwrap().matched);
    }

    #[test]
    fn test_score_clamped_high_and_low() {
        let raw = json!({
            "overallScore": 150,
            "sections": [
                {"sectionId": "s1", "score": -5, "revisedText": "x"},
                {"sectionId": "s2", "score": 87.6, "revisedText": "y"}
            ]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.overall_score, Some(100));
        assert_eq!(result.sections[0].score, Some(0));
        assert_eq!(result.sections[1].score, Some(88));
    }

    #[test]
    fn test_non_numeric_score_is_absent_not_zero() {
        let raw = json!({
            "overallScore": "very good",
            "sections": [{"sectionId": "s1", "score": null, "revisedText": "x"}]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.overall_score, None);
        assert_eq!(result.sections[0].score, None);
    }

    #[test]
    fn test_quoted_numeric_score_is_accepted() {
        let raw = json!({"overallScore": "92", "sections": []}).to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.overall_score, Some(92));
    }

    #[test]
    fn test_revised_text_falls_back_to_section_original() {
        let raw = json!({
            "sections": [
                {"sectionId": "s1", "summary": "短い", "revisedText": "  "},
                {"sectionId": "s2", "summary": "良い"}
            ]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.sections[0].revised_text, "私はエンジニアです。");
        assert_eq!(result.sections[1].revised_text, "5年間開発をしています。");
    }

    #[test]
    fn test_section_resolution_by_index_when_id_unknown() {
        let raw = json!({
            "sections": [{"sectionId": "made-up", "revisedText": "書き直し"}]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        // Falls back to position 0 → s1; title re-derived from input.
        assert_eq!(result.sections[0].section_id, "s1");
        assert_eq!(result.sections[0].section_title, "自己紹介");
    }

    #[test]
    fn test_unresolvable_section_feedback_is_discarded() {
        let raw = json!({
            "sections": [
                {"sectionId": "s1", "revisedText": "a"},
                {"sectionId": "s2", "revisedText": "b"},
                {"sectionId": "ghost", "revisedText": "c"}
            ]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.sections.len(), 2);
    }

    #[test]
    fn test_category_id_normalized_and_label_rederived() {
        let raw = json!({
            "sections": [{
                "sectionId": "s1",
                "revisedText": "x",
                "categories": [
                    {"id": "わかりやすさ", "comment": "冗長です", "suggestion": "短く", "priority": "high"},
                    {"id": "mystery", "comment": "何か", "suggestion": "", "priority": "??"}
                ]
            }]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        let categories = &result.sections[0].categories;
        assert_eq!(categories[0].id, CategoryId::Clarity);
        assert_eq!(categories[0].label, "わかりやすさ");
        assert_eq!(categories[0].priority, Priority::High);
        assert_eq!(categories[1].id, CategoryId::Other);
        assert_eq!(categories[1].label, "その他");
        assert_eq!(categories[1].priority, Priority::Medium);
    }

    #[test]
    fn test_category_without_comment_or_suggestion_is_dropped() {
        let raw = json!({
            "sections": [{
                "sectionId": "s1",
                "revisedText": "x",
                "categories": [
                    {"id": "tone", "comment": "", "suggestion": "  "},
                    {"id": "grammar", "comment": "誤字があります", "suggestion": ""}
                ]
            }]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.sections[0].categories.len(), 1);
        assert_eq!(result.sections[0].categories[0].id, CategoryId::Grammar);
    }

    #[test]
    fn test_follow_up_without_question_is_dropped_and_empty_collapses() {
        let raw = json!({
            "sections": [],
            "followUpQuestions": [
                {"id": "q1", "question": "  "},
                {"id": "q2"}
            ]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert!(result.follow_up_questions.is_none());
    }

    #[test]
    fn test_follow_up_missing_id_gets_positional_fallback() {
        let raw = json!({
            "sections": [],
            "followUpQuestions": [
                {"question": "チーム規模は？", "sectionId": "s2"}
            ]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        let questions = result.follow_up_questions.unwrap();
        assert_eq!(questions[0].id, "question-1");
        assert_eq!(questions[0].section_id.as_deref(), Some("s2"));
        assert_eq!(questions[0].question, "チーム規模は？");
    }

    #[test]
    fn test_suggestions_keep_only_non_blank_strings() {
        let raw = json!({
            "sections": [],
            "suggestions": ["数値を足す", "", 42, "  "]
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert_eq!(result.suggestions, vec!["数値を足す".to_string()]);
    }

    #[test]
    fn test_style_compliance_requires_boolish_matched() {
        let raw = json!({
            "sections": [],
            "styleCompliance": {"matched": "true", "notes": "概ね準拠"}
        })
        .to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        let compliance = result.style_compliance.unwrap();
        assert!(compliance.matched);
        assert_eq!(compliance.notes.as_deref(), Some("概ね準拠"));

        let raw = json!({"sections": [], "styleCompliance": {"notes": "?"}}).to_string();
        let result = parse_review_response(&raw, &sections()).unwrap();
        assert!(result.style_compliance.is_none());
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(matches!(
            parse_review_response("{\"overallSummary\": \"never closed\"", &sections()),
            Err(ParseError::UnparsableResponse)
        ));
    }
}
