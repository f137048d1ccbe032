//! Domain models for the review pipeline.
//!
//! Wire DTOs are camelCase (the web client speaks camelCase JSON); enum
//! tokens are snake_case. Everything arriving from the generation service
//! goes through `parser` before it becomes one of these types.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Style options
// ────────────────────────────────────────────────────────────────────────────

/// Desired tone of the rewritten text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Polite keigo (です・ます調).
    Keigo,
    /// Plain form (だ・である調).
    Futsukei,
    Business,
    Casual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingStyle {
    Formal,
    Neutral,
    Story,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Honorific {
    Standard,
    Respectful,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Ja,
    En,
}

/// Caller-owned style contract for one review request. Immutable per request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOptions {
    pub tone: Tone,
    pub writing_style: WritingStyle,
    pub honorific: Honorific,
    pub audience: Audience,
    pub language: Language,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// A section block as submitted by the caller. Id and title may be missing;
/// the sanitizer fills them in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSection {
    pub id: Option<String>,
    pub title: Option<String>,
    pub text: String,
}

/// A sanitized section: unique id, non-blank title, non-empty trimmed text.
/// Never mutated in place — transformations produce new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub text: String,
}

impl From<Section> for RawSection {
    fn from(s: Section) -> Self {
        RawSection {
            id: Some(s.id),
            title: Some(s.title),
            text: s.text,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback taxonomy
// ────────────────────────────────────────────────────────────────────────────

/// The closed feedback category taxonomy. Every category id arriving from
/// the generation service is normalized into this set; anything
/// unrecognized lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Clarity,
    Structure,
    Quantitative,
    Story,
    Fit,
    Tone,
    Grammar,
    Other,
}

impl CategoryId {
    /// Normalizes an open-ended category label into the closed taxonomy.
    /// Many-to-one: Japanese and English synonyms collapse to one id.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "clarity" | "わかりやすさ" | "分かりやすさ" | "明確さ" | "明瞭さ" => {
                CategoryId::Clarity
            }
            "structure" | "構成" | "構造" | "論理構成" => CategoryId::Structure,
            "quantitative" | "定量性" | "定量" | "数値" | "具体性" => CategoryId::Quantitative,
            "story" | "storytelling" | "ストーリー" | "ストーリー性" => CategoryId::Story,
            "fit" | "company_fit" | "企業フィット" | "フィット" | "適合性" => CategoryId::Fit,
            "tone" | "トーン" | "語調" | "文体" => CategoryId::Tone,
            "grammar" | "文法" | "文法・表現" | "表現" | "誤字脱字" => CategoryId::Grammar,
            _ => CategoryId::Other,
        }
    }

    /// Display label, always derived from the normalized id — never trusted
    /// from the service response.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryId::Clarity => "わかりやすさ",
            CategoryId::Structure => "構成",
            CategoryId::Quantitative => "定量性",
            CategoryId::Story => "ストーリー性",
            CategoryId::Fit => "企業フィット",
            CategoryId::Tone => "トーン",
            CategoryId::Grammar => "文法・表現",
            CategoryId::Other => "その他",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Lenient normalization; anything unrecognized becomes `Medium`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" | "高" | "重要" => Priority::High,
            "low" | "低" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Review result
// ────────────────────────────────────────────────────────────────────────────

/// One piece of category feedback on a section. Dropped entirely by the
/// parser if both `comment` and `suggestion` are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFeedback {
    pub id: CategoryId,
    pub label: String,
    pub comment: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub priority: Priority,
}

/// Per-section feedback. `revised_text` is never empty: the parser falls
/// back to the original section text when the service omits a rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFeedback {
    pub section_id: String,
    pub section_title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub revised_text: String,
    pub categories: Vec<CategoryFeedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleCompliance {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A clarification request emitted by the generation service when it judges
/// a section underspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpQuestion {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_info_hint: Option<String>,
}

/// A previously answered (or skipped) follow-up question, replayed into
/// subsequent prompts so the service does not re-ask it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredFollowUp {
    pub id: String,
    pub answer: String,
}

/// The validated output of one review round-trip.
///
/// `overall_score` absent means "not evaluated" — a distinct state from a
/// zero score. `follow_up_questions` absent (not an empty list) signals
/// "no follow-up needed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    pub overall_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<u8>,
    pub sections: Vec<SectionFeedback>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_compliance: Option<StyleCompliance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_questions: Option<Vec<FollowUpQuestion>>,
}
