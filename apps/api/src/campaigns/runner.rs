//! Campaign Runner — orchestrates one "day" of one campaign.
//!
//! Flow: eligibility checks → profile checks → claim run lock →
//!       aggregate connectors → match → drop attempted/unmailable →
//!       quota-truncate → per-job generate→dispatch→persist → counters.
//!
//! This is the only module with orchestration logic and the only one that
//! writes campaign state. Everything inside the per-job loop is isolated:
//! one listing's failure becomes one `failed` row, never an abort.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::campaigns::store::{CampaignStore, NewApplication};
use crate::generation::letter::{
    self, application_html, application_subject, LetterGenerator,
};
use crate::mailer::{EmailSender, OutgoingEmail};
use crate::matching;
use crate::models::campaign::{ApplicationStatus, JobCampaign};
use crate::models::profile::{is_well_formed_email, CandidateProfile};
use crate::sources::{aggregate, JobSourceConnector};

/// Everything the runner needs, injected so tests can substitute doubles.
/// No hidden singletons: construction happens once in `main`.
pub struct CampaignDeps {
    pub store: Arc<dyn CampaignStore>,
    /// Fixed order — it is also the aggregator's dedup priority order.
    pub connectors: Vec<Arc<dyn JobSourceConnector>>,
    pub generator: Arc<dyn LetterGenerator>,
    pub sender: Arc<dyn EmailSender>,
}

/// Closed error taxonomy for campaign runs.
///
/// `CampaignNotEligible`, `ProfileIncomplete`, and `AlreadyRunning` are
/// normal zero-sent outcomes carried inside `RunOutcome::Skipped`;
/// only `Persistence` propagates as `Err`, and the triggers catch it per
/// campaign.
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("campaign not eligible: {0}")]
    CampaignNotEligible(String),

    #[error("profile incomplete: {0}")]
    ProfileIncomplete(String),

    #[error("a run of this campaign is already in progress")]
    AlreadyRunning,

    #[error("persistence failed: {0}")]
    Persistence(String),
}

/// Result of one runner invocation.
#[derive(Debug)]
pub enum RunOutcome {
    /// The run executed; `sent` of `total` attempted applications went out.
    Ran { sent: u32, total: u32 },
    /// A precondition failed; nothing was fetched or sent.
    Skipped { reason: CampaignError },
}

fn persistence(e: anyhow::Error) -> CampaignError {
    CampaignError::Persistence(e.to_string())
}

fn skipped(reason: CampaignError) -> Result<RunOutcome, CampaignError> {
    Ok(RunOutcome::Skipped { reason })
}

/// Runs one campaign day for `campaign_id` owned by `owner_id`.
pub async fn run_campaign_day(
    deps: &CampaignDeps,
    campaign_id: Uuid,
    owner_id: Uuid,
) -> Result<RunOutcome, CampaignError> {
    // Step 1: campaign eligibility — no further I/O on failure.
    let campaign = deps
        .store
        .campaign(campaign_id, owner_id)
        .await
        .map_err(persistence)?;
    let Some(campaign) = campaign else {
        return skipped(CampaignError::CampaignNotEligible(
            "campaign not found".to_string(),
        ));
    };
    if !campaign.is_active() {
        return skipped(CampaignError::CampaignNotEligible(format!(
            "campaign is {}",
            campaign.status
        )));
    }
    if campaign.has_ended(Utc::now()) {
        // Expiry is observed at evaluation time: flip to completed even
        // though nothing will be sent this run.
        deps.store
            .finish_run(campaign.id, 0, true)
            .await
            .map_err(persistence)?;
        info!("Campaign {} reached its end date, marked completed", campaign.id);
        return skipped(CampaignError::CampaignNotEligible(
            "campaign period has ended".to_string(),
        ));
    }

    // Step 2: profile completeness — still before any listing fetch.
    let profile = deps.store.profile(owner_id).await.map_err(persistence)?;
    let Some(profile) = profile else {
        return skipped(CampaignError::ProfileIncomplete(
            "no candidate profile".to_string(),
        ));
    };
    if let Some(reason) = profile_gap(&profile) {
        return skipped(CampaignError::ProfileIncomplete(reason));
    }

    // Run lock: claim before fetching, release on every exit path below.
    if !deps
        .store
        .try_claim_run(campaign.id)
        .await
        .map_err(persistence)?
    {
        return skipped(CampaignError::AlreadyRunning);
    }

    let result = run_claimed(deps, &campaign, &profile).await;

    if let Err(e) = deps.store.release_run(campaign.id).await {
        warn!("Failed to release run lock for campaign {}: {e}", campaign.id);
    }

    result
}

/// Returns the first completeness gap, or `None` when the profile can run.
fn profile_gap(profile: &CandidateProfile) -> Option<String> {
    if !profile.auto_apply {
        return Some("auto-apply is disabled".to_string());
    }
    if profile.full_name.trim().is_empty() {
        return Some("candidate name is empty".to_string());
    }
    match profile.campaign_email.as_deref() {
        None => Some("campaign email is missing".to_string()),
        Some(email) if !is_well_formed_email(email) => {
            Some(format!("campaign email '{email}' is malformed"))
        }
        Some(_) => None,
    }
}

/// Steps 3–10, executed under the run lock.
async fn run_claimed(
    deps: &CampaignDeps,
    campaign: &JobCampaign,
    profile: &CandidateProfile,
) -> Result<RunOutcome, CampaignError> {
    // Step 3: one concurrent fan-out across all connectors.
    let query = aggregate::query_for(profile);
    let jobs = aggregate::fetch_all(&deps.connectors, &query).await;
    info!(
        "Campaign {}: {} listings aggregated from {} sources",
        campaign.id,
        jobs.len(),
        deps.connectors.len()
    );

    // Step 4: profile matching.
    let matched = matching::match_jobs(jobs, profile);

    // Step 5: drop everything already attempted (any status) and anything
    // we cannot email.
    let attempted = deps
        .store
        .attempted_external_ids(campaign.id)
        .await
        .map_err(persistence)?;
    let mut candidates: Vec<_> = matched
        .into_iter()
        .filter(|job| !attempted.contains(&job.external_id))
        .filter(|job| job.contact_email.is_some())
        .collect();

    // Step 6: quota.
    candidates.truncate(campaign.max_applications_per_day.max(0) as usize);

    info!(
        "Campaign {}: attempting {} new applications (quota {})",
        campaign.id,
        candidates.len(),
        campaign.max_applications_per_day
    );

    // Step 7: per-job loop, each iteration isolated.
    let summary = letter::profile_summary(profile);
    let reply_to = profile.campaign_email.clone().unwrap_or_default();
    let total = candidates.len() as u32;
    let mut sent = 0u32;

    for job in candidates {
        let Some(to) = job.contact_email.clone() else {
            continue; // filtered above
        };

        let body = match deps.generator.generate(&summary, &job).await {
            Some(text) => text,
            None => letter::fallback_letter(profile, &job),
        };

        let email = OutgoingEmail {
            to,
            subject: application_subject(&job),
            html: application_html(&body, profile),
            reply_to: reply_to.clone(),
        };
        let outcome = deps.sender.send(&email).await;

        // Step 7 (persist): exactly one row per attempt, real outcome.
        let row = NewApplication {
            campaign_id: campaign.id,
            target_name: job.target_name(),
            target_email: email.to,
            target_url: job.url.clone(),
            source: job.source.clone(),
            target_external_id: job.external_id.clone(),
            cover_letter: Some(body),
            status: if outcome.ok {
                ApplicationStatus::Sent
            } else {
                ApplicationStatus::Failed
            },
            error_message: outcome.error,
        };

        match deps.store.insert_application(&row).await {
            // Only rows actually on disk count toward total_sent.
            Ok(()) if outcome.ok => sent += 1,
            Ok(()) => {}
            Err(e) => {
                warn!(
                    "Campaign {}: failed to record application for listing {}: {e}",
                    campaign.id, job.external_id
                );
            }
        }
    }

    // Steps 8–9: counters, timestamps, and the expiry transition.
    let completed = campaign.has_ended(Utc::now());
    deps.store
        .finish_run(campaign.id, sent, completed)
        .await
        .map_err(persistence)?;

    info!("Campaign {}: sent {}/{} applications", campaign.id, sent, total);
    Ok(RunOutcome::Ran { sent, total })
}
