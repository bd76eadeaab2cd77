//! Cover-letter generation — pluggable, trait-based, never fatal.
//!
//! Default: `LlmLetterGenerator` (Claude via `LlmClient`). A generation
//! failure of any kind yields `None`; the runner substitutes the candidate's
//! own fallback text or a generic template, so one flaky LLM call can never
//! sink an application.

use async_trait::async_trait;
use tracing::warn;

use crate::generation::prompts::{LETTER_PROMPT_TEMPLATE, LETTER_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::job::CanonicalJob;
use crate::models::profile::CandidateProfile;

/// The letter generator trait. Implement this to swap backends without
/// touching the runner.
///
/// Carried in `CampaignDeps` as `Arc<dyn LetterGenerator>`.
#[async_trait]
pub trait LetterGenerator: Send + Sync {
    /// Produces a short personalized letter body, or `None` on any failure.
    async fn generate(&self, profile_summary: &str, job: &CanonicalJob) -> Option<String>;
}

/// Claude-backed generator. All API mechanics (retries, backoff, missing
/// key) live in `LlmClient`; this type only builds the prompt and absorbs
/// errors into `None`.
pub struct LlmLetterGenerator {
    llm: LlmClient,
}

impl LlmLetterGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl LetterGenerator for LlmLetterGenerator {
    async fn generate(&self, profile_summary: &str, job: &CanonicalJob) -> Option<String> {
        let prompt = build_letter_prompt(profile_summary, job);
        match self.llm.call_text(&prompt, LETTER_SYSTEM).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Letter generation failed for {}: {e}", job.external_id);
                None
            }
        }
    }
}

fn build_letter_prompt(profile_summary: &str, job: &CanonicalJob) -> String {
    LETTER_PROMPT_TEMPLATE
        .replace("{profile_summary}", profile_summary)
        .replace("{target_name}", &job.target_name())
        .replace(
            "{place}",
            if job.place.is_empty() {
                "unspecified"
            } else {
                job.place.as_str()
            },
        )
        .replace(
            "{contract}",
            job.contract.map(|c| c.as_str()).unwrap_or("unspecified"),
        )
}

/// One-paragraph candidate summary handed to the generator.
pub fn profile_summary(profile: &CandidateProfile) -> String {
    let mut parts = vec![format!("Name: {}", profile.full_name)];
    if !profile.preferred_titles.is_empty() {
        parts.push(format!(
            "Looking for roles: {}",
            profile.preferred_titles.join(", ")
        ));
    }
    if !profile.locations.is_empty() {
        parts.push(format!("Preferred locations: {}", profile.locations.join(", ")));
    }
    if let Some(contract) = profile.preferred_contract() {
        parts.push(format!("Preferred contract: {}", contract.as_str()));
    }
    parts.join("\n")
}

/// Body used when generation returns `None`: the candidate's own fallback
/// text if they provided one, else a short generic template.
pub fn fallback_letter(profile: &CandidateProfile, job: &CanonicalJob) -> String {
    if let Some(text) = profile
        .default_cover_letter
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return text.to_string();
    }

    format!(
        "Hello,\n\n\
        I am writing to apply for the {} position. My background matches what \
        you are looking for, and I would be glad to tell you more about it.\n\n\
        I am available for an interview at your convenience.\n\n\
        Best regards,\n{}",
        job.target_name(),
        profile.full_name
    )
}

pub fn application_subject(job: &CanonicalJob) -> String {
    format!("Application: {}", job.target_name())
}

/// Wraps a plain-text letter into the HTML body the dispatcher sends.
/// Blank-line-separated blocks become paragraphs; single newlines become
/// line breaks.
pub fn application_html(letter: &str, profile: &CandidateProfile) -> String {
    let paragraphs: String = letter
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format!("<p>{}</p>", escape_html(block).replace('\n', "<br>")))
        .collect();

    format!(
        "<div>{paragraphs}<p style=\"color:#666;font-size:12px\">Sent on behalf of {} via Canvass.</p></div>",
        escape_html(&profile.full_name)
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
