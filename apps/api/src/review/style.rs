//! Style Directive Composer — maps the enumerated style contract to fixed
//! natural-language directives and assembles the full review prompt.
//!
//! Directives are a static lookup, never generated. The composer also embeds
//! the category rubric and a strict output-shape template so the generation
//! service is more likely to answer compliantly — compliance is never
//! assumed; the parser defends the boundary.

use anyhow::Result;

use crate::llm_client::prompts::FIDELITY_INSTRUCTION;
use crate::review::models::{
    AnsweredFollowUp, Audience, Honorific, Language, Section, StyleOptions, Tone, WritingStyle,
};
use crate::review::prompts::{
    ANSWERED_FOLLOW_UPS_HEADING, CATEGORY_RUBRIC, COMPANY_CONTEXT_HEADING, OUTPUT_SHAPE,
    REVIEW_PROMPT_TEMPLATE,
};

/// One fixed directive sentence per tone value.
pub fn tone_directive(tone: Tone) -> &'static str {
    match tone {
        Tone::Keigo => "文章全体を丁寧な敬語（です・ます調）で統一してください。",
        Tone::Futsukei => "文章全体を常体（だ・である調）で統一してください。",
        Tone::Business => "ビジネス文書として適切な、簡潔で礼儀正しい文体に整えてください。",
        Tone::Casual => "親しみやすく、柔らかい口語的な文体に整えてください。",
    }
}

pub fn writing_style_directive(style: WritingStyle) -> &'static str {
    match style {
        WritingStyle::Formal => "論理的な構成を重視し、形式的な書き方でまとめてください。",
        WritingStyle::Neutral => "事実を中心に、過度な装飾のない中立的な書き方でまとめてください。",
        WritingStyle::Story => "経験の流れと動機が伝わるストーリー仕立ての書き方でまとめてください。",
    }
}

pub fn honorific_directive(honorific: Honorific) -> &'static str {
    match honorific {
        Honorific::Standard => "一般的な敬称・敬語レベルを維持してください。",
        Honorific::Respectful => "読み手への敬意が強く伝わる、より丁寧な敬語を用いてください。",
        Honorific::None => "敬称や過剰な敬語は用いず、簡潔に記述してください。",
    }
}

pub fn audience_directive(audience: Audience) -> &'static str {
    match audience {
        Audience::Internal => "社内の採用担当者が読む前提で、省略語には短い補足を添えてください。",
        Audience::External => "社外の第三者が初見で読む前提で、文脈を補いながら記述してください。",
    }
}

pub fn language_directive(language: Language) -> &'static str {
    match language {
        Language::Ja => "すべての出力は日本語で記述してください。",
        Language::En => "Write every part of the output in English.",
    }
}

/// Renders the five style directives as a bulleted instruction block.
pub fn style_directive_block(options: &StyleOptions) -> String {
    [
        tone_directive(options.tone),
        writing_style_directive(options.writing_style),
        honorific_directive(options.honorific),
        audience_directive(options.audience),
        language_directive(options.language),
    ]
    .iter()
    .map(|d| format!("- {d}"))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Builds the full review prompt: fidelity instruction, style directives,
/// optional company context, previously answered follow-ups, the category
/// rubric, the section payload, and the output-shape template.
pub fn compose_review_prompt(
    sections: &[Section],
    options: &StyleOptions,
    company_context: Option<&str>,
    answered_follow_ups: &[AnsweredFollowUp],
) -> Result<String> {
    let sections_json = serde_json::to_string_pretty(sections)?;

    let company_block = match company_context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("{COMPANY_CONTEXT_HEADING}\n{context}"),
        None => String::new(),
    };

    let answered_block = if answered_follow_ups.is_empty() {
        String::new()
    } else {
        let rendered = answered_follow_ups
            .iter()
            .map(|a| format!("- ({}) {}", a.id, a.answer))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{ANSWERED_FOLLOW_UPS_HEADING}\n{rendered}")
    };

    Ok(REVIEW_PROMPT_TEMPLATE
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{style_directives}", &style_directive_block(options))
        .replace("{company_context}", &company_block)
        .replace("{answered_follow_ups}", &answered_block)
        .replace("{category_rubric}", CATEGORY_RUBRIC)
        .replace("{sections_json}", &sections_json)
        .replace("{output_shape}", OUTPUT_SHAPE))
}
