// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Audience framing shared by every student-facing narrative prompt.
pub const STUDENT_AUDIENCE: &str = "\
    The reader is a high-school or early-college student choosing a career path. \
    Use plain, encouraging language. Do not give medical advice.";
