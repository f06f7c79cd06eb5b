// Shared prompt fragments. Each step that calls the model keeps its own
// prompts.rs alongside it; only cross-cutting instructions live here.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt that enforces a bare HTML document as output.
pub const HTML_ONLY_SYSTEM: &str = "You are a meticulous front-end engineer formatting resumes. \
    You MUST respond with a single HTML document only. \
    Do NOT use markdown code fences. \
    Do NOT include commentary before or after the document.";

/// Appended to every prompt that carries resume text.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Use ONLY the facts present in the resume. \
    Do NOT invent employers, dates, metrics, or credentials. \
    Keep the author's wording wherever possible.";
