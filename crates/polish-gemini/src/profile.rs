//! Mode-specific instruction profiles

use polish_core::CorrectionMode;
use serde_json::{json, Value};

const BASIC_INSTRUCTION: &str = "You are a strict grammar corrector.
Your task is to fix grammar, spelling, and punctuation errors ONLY.
Do not change the style or tone. Keep the original meaning exactly as is.

Return the result in JSON format with the corrected text.";

const ADVANCED_INSTRUCTION: &str = "You are an expert editor and writing coach.
Your task is to significantly improve the user's text.
Focus on:
1. Correcting all grammar and spelling errors.
2. Enhancing flow, tone, and vocabulary for a professional standard.
3. Improving clarity and conciseness.

Return the result in JSON format with the corrected text and a brief explanation of the major stylistic improvements made.";

/// System instruction sent with every request of `mode`
#[must_use]
pub fn system_instruction(mode: CorrectionMode) -> &'static str {
    match mode {
        CorrectionMode::Basic => BASIC_INSTRUCTION,
        CorrectionMode::Advanced => ADVANCED_INSTRUCTION,
    }
}

/// Structured-output schema in Gemini's OpenAPI subset
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "correctedText": {
                "type": "STRING",
                "description": "The fully corrected version of the input text."
            },
            "explanation": {
                "type": "STRING",
                "description": "A brief explanation of changes (mainly for advanced mode).",
                "nullable": true
            },
            "changes": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Individual changes made, in order.",
                "nullable": true
            }
        },
        "required": ["correctedText"]
    })
}
