// All LLM prompt constants for the letter-generation module.

/// System prompt for cover-letter generation — plain text output only.
pub const LETTER_SYSTEM: &str =
    "You are an expert career coach writing short, personal job-application \
    emails on behalf of a candidate. \
    Write in the first person as the candidate. \
    Respond with the letter text only. \
    Do NOT include a subject line, markdown, or commentary. \
    Do NOT invent qualifications that are not in the candidate summary.";

/// Cover-letter prompt template.
/// Replace: {profile_summary}, {target_name}, {place}, {contract}
pub const LETTER_PROMPT_TEMPLATE: &str = r#"Write a job-application email body for the candidate below.

CANDIDATE:
{profile_summary}

TARGET OPENING:
- Position: {target_name}
- Location: {place}
- Contract: {contract}

Rules:
- 8 to 12 lines of plain text.
- Open by naming the position applied for.
- Pick the one or two most relevant points from the candidate summary; do not list everything.
- End with a closing line and a proposal to schedule an interview.
- No placeholders: every sentence must stand on its own as written."#;
