//! Trigger surface — the two thin entry points over the runner.
//!
//! Both iterate campaigns sequentially and give each run its own failure
//! boundary: one campaign's unexpected error becomes one error entry in the
//! results, never an aborted batch.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::campaigns::runner::{run_campaign_day, CampaignError, RunOutcome};
use crate::errors::AppError;
use crate::models::campaign::JobCampaign;
use crate::state::AppState;

/// Per-campaign entry in a trigger response: either counters or an error.
#[derive(Debug, Serialize)]
pub struct CampaignRunResult {
    pub campaign_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ScheduledRunResponse {
    pub ok: bool,
    pub processed: usize,
    pub results: Vec<CampaignRunResult>,
}

#[derive(Serialize)]
pub struct ManualRunResponse {
    pub ok: bool,
    pub message: String,
    pub processed: usize,
    pub results: Vec<CampaignRunResult>,
}

#[derive(Deserialize)]
pub struct SecretQuery {
    pub secret: Option<String>,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

fn result_entry(
    campaign: &JobCampaign,
    outcome: Result<RunOutcome, CampaignError>,
) -> CampaignRunResult {
    let (sent, total, error) = match outcome {
        Ok(RunOutcome::Ran { sent, total }) => (Some(sent), Some(total), None),
        Ok(RunOutcome::Skipped { reason }) => (None, None, Some(reason.to_string())),
        Err(e) => {
            error!("Campaign {} run failed: {e}", campaign.id);
            (None, None, Some(e.to_string()))
        }
    };
    CampaignRunResult {
        campaign_id: campaign.id,
        user_id: campaign.user_id,
        sent,
        total,
        error,
    }
}

async fn run_each(state: &AppState, campaigns: &[JobCampaign]) -> Vec<CampaignRunResult> {
    let mut results = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        let outcome = run_campaign_day(&state.deps, campaign.id, campaign.user_id).await;
        results.push(result_entry(campaign, outcome));
    }
    results
}

/// Whether a scheduled-trigger caller is authorized.
///
/// With no secret configured, everyone is — an explicit deployment choice,
/// warned about at startup.
fn scheduled_caller_authorized(
    configured_secret: Option<&str>,
    headers: &HeaderMap,
    query_secret: Option<&str>,
) -> bool {
    let Some(secret) = configured_secret else {
        return true;
    };
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer == Some(secret) || query_secret == Some(secret)
}

/// POST /api/v1/campaigns/run-scheduled
pub async fn handle_run_scheduled(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SecretQuery>,
) -> Result<Json<ScheduledRunResponse>, AppError> {
    if !scheduled_caller_authorized(
        state.config.cron_secret.as_deref(),
        &headers,
        params.secret.as_deref(),
    ) {
        return Err(AppError::Unauthorized);
    }

    let campaigns = state
        .deps
        .store
        .active_campaigns()
        .await
        .map_err(AppError::Internal)?;
    info!("Scheduled trigger: {} active campaigns", campaigns.len());

    let results = run_each(&state, &campaigns).await;
    Ok(Json(ScheduledRunResponse {
        ok: true,
        processed: results.len(),
        results,
    }))
}

/// POST /api/v1/campaigns/run
pub async fn handle_run_manual(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ManualRunResponse>, AppError> {
    let campaigns = state
        .deps
        .store
        .active_campaigns_for(params.user_id)
        .await
        .map_err(AppError::Internal)?;

    if campaigns.is_empty() {
        return Ok(Json(ManualRunResponse {
            ok: true,
            message: "No active campaign to run.".to_string(),
            processed: 0,
            results: vec![],
        }));
    }

    let results = run_each(&state, &campaigns).await;
    let message = summarize(&results);
    Ok(Json(ManualRunResponse {
        ok: true,
        message,
        processed: results.len(),
        results,
    }))
}

/// Human-readable rollup for the manual endpoint: total sent if anything
/// went out, else the first reported reason, else a generic explanation.
fn summarize(results: &[CampaignRunResult]) -> String {
    let sent: u32 = results.iter().filter_map(|r| r.sent).sum();
    if sent > 0 {
        let campaigns = results.iter().filter(|r| r.sent.unwrap_or(0) > 0).count();
        return format!(
            "Sent {sent} new application(s) across {campaigns} campaign(s)."
        );
    }
    if let Some(reason) = results.iter().find_map(|r| r.error.clone()) {
        return reason;
    }
    "No new application found or quota reached.".to_string()
}
