// Cross-cutting prompt fragments. Task-specific prompts live next to the
// module that sends them.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps generated content within what the profile actually says.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every statement must be supported by the candidate profile provided. \
    Do NOT invent employers, titles, dates, metrics, degrees or certifications. \
    Rephrase and reorder freely, but omit anything the profile does not support.";
