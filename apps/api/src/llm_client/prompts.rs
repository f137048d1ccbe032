// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to all review prompts.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Critique and rewrite ONLY the text provided in the sections. \
    Do NOT invent achievements, numbers, employers, or dates that are not \
    present in the original text. If information needed for a stronger \
    rewrite is missing, ask for it through followUpQuestions instead of \
    fabricating it.";
