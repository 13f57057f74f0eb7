// Prompt constants for resume draft generation.

/// System prompt for draft generation.
pub const GENERATE_SYSTEM: &str = "You are an expert resume writer who tailors a candidate's \
    existing experience to a specific job description.";

/// Draft generation prompt. Replace `{job_description}`, `{profile_json}` and
/// `{grounding_instruction}` before sending.
pub const GENERATE_PROMPT_TEMPLATE: &str = r#"Tailor the candidate profile below to the job description.

{grounding_instruction}

Rules:
- Keep every experience and project that exists in the profile; you may drop weak ones.
- Use the exact company names and project names from the profile.
- At most 5 bullets per experience, each a single sentence starting with a verb.
- Group skills into 2 to 5 categories relevant to the job.
- The summary is 2 or 3 sentences in the third person without the candidate's name.

Return a JSON object with this EXACT schema (no extra fields):
{
  "summary": "string",
  "experiences": [
    {"role": "string", "company": "string", "location": "string or null",
     "period": "string or null", "bullets": ["string"]}
  ],
  "projects": [
    {"name": "string", "description": "string or null", "url": "string or null",
     "period": "string or null", "bullets": ["string"]}
  ],
  "skills_by_category": {"Category": ["skill"]}
}

JOB DESCRIPTION:
{job_description}

CANDIDATE PROFILE (JSON):
{profile_json}"#;

/// Appended on retry when the previous answer named companies that are not
/// in the profile. Replace `{companies}`.
pub const RETRY_UNGROUNDED_SUFFIX: &str = "\n\nYour previous answer mentioned companies that \
    are not in the profile: {companies}. Use only companies from the profile.";
