// Shared prompt constants.
// Each analysis kind defines its own template in analysis/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// System prompt that enforces JSON-only output for every analysis call.
pub const JSON_ONLY_SYSTEM: &str = "You are an experienced psychologist assessing \
    candidates for officer selection. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every template so short answers still get a compact report.
pub const BREVITY_INSTRUCTION: &str = "\
    Be concise, insightful, and professional. \
    Prefer short point-based phrasing over long paragraphs.";
