// All LLM prompt constants for the review module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// The fixed feedback rubric embedded in every review prompt. Seven scored
/// categories; `other` exists in the taxonomy as the parser's catch-all and
/// is intentionally not offered to the model.
pub const CATEGORY_RUBRIC: &str = r#"FEEDBACK CATEGORIES (use these exact ids):
- "clarity": わかりやすさ — is the point understandable on first read?
- "structure": 構成 — does the section have a logical order (situation → action → result)?
- "quantitative": 定量性 — are claims backed by concrete numbers?
- "story": ストーリー性 — does the narrative show motivation and growth?
- "fit": 企業フィット — does the content connect to the target company/role?
- "tone": トーン — does the register match the requested style contract?
- "grammar": 文法・表現 — grammar, typos, awkward phrasing"#;

/// Strict output-shape template. The parser never assumes compliance; this
/// only raises the odds of a directly decodable response.
pub const OUTPUT_SHAPE: &str = r#"Return ONE JSON object with this EXACT shape (no extra fields):
{
  "overallSummary": "2-3 sentence overall critique",
  "overallScore": 72,
  "sections": [
    {
      "sectionId": "the-exact-id-from-input",
      "sectionTitle": "the section title",
      "summary": "1-2 sentence critique of this section",
      "score": 68,
      "revisedText": "the full rewritten section text, honoring every style directive",
      "categories": [
        {
          "id": "quantitative",
          "comment": "what is weak and why",
          "suggestion": "concrete fix the writer can apply",
          "example": "optional rewritten sentence demonstrating the fix",
          "priority": "high"
        }
      ]
    }
  ],
  "suggestions": ["optional cross-section advice"],
  "styleCompliance": {"matched": true, "notes": "optional note on directives you could not fully honor"},
  "followUpQuestions": [
    {
      "id": "q1",
      "sectionId": "the-section-this-concerns",
      "question": "one specific question whose answer would improve the rewrite",
      "reason": "why the information is needed",
      "missingInfoHint": "e.g. team size, duration, metrics"
    }
  ]
}

Rules:
- All scores are integers from 0 to 100. Omit a score rather than guessing.
- "revisedText" is REQUIRED for every section and must never be empty.
- Ask followUpQuestions ONLY when information is genuinely missing; omit the
  array entirely when there is nothing to ask.
- Do not re-ask questions listed as already answered."#;

/// Review prompt template.
/// Replace: {fidelity_instruction}, {style_directives}, {company_context},
///          {answered_follow_ups}, {category_rubric}, {sections_json},
///          {output_shape}
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"You are a professional reviewer of Japanese job-hunting resumes and portfolios. Critique and rewrite the sections below under the given style contract.

{fidelity_instruction}

STYLE DIRECTIVES (apply every one to each rewrite):
{style_directives}

{company_context}

{answered_follow_ups}

{category_rubric}

SECTIONS TO REVIEW:
{sections_json}

{output_shape}"#;

/// Heading for the company-context block, rendered only when present.
pub const COMPANY_CONTEXT_HEADING: &str =
    "TARGET COMPANY CONTEXT (tailor fit feedback to this):";

/// Heading for the answered-follow-ups block, rendered only when present.
pub const ANSWERED_FOLLOW_UPS_HEADING: &str =
    "ALREADY ANSWERED CLARIFICATIONS (do not re-ask these):";
