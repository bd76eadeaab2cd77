//! Campaign persistence seam.
//!
//! The runner only ever talks to `CampaignStore`, so tests substitute an
//! in-memory double and production wires `PgCampaignStore`. Every method is
//! a single statement against Postgres; the one piece of cleverness is
//! `try_claim_run`, a compare-and-set on the `running` marker that gives
//! each campaign at-most-one concurrent run.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::campaign::{ApplicationStatus, CampaignStatus, JobCampaign};
use crate::models::profile::CandidateProfile;

/// Insert shape for one application outcome row.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub campaign_id: Uuid,
    pub target_name: String,
    pub target_email: String,
    pub target_url: String,
    pub source: String,
    pub target_external_id: String,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub error_message: Option<String>,
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// One campaign, scoped to its owner — a foreign id reads as absent.
    async fn campaign(&self, id: Uuid, owner: Uuid) -> Result<Option<JobCampaign>>;

    async fn profile(&self, owner: Uuid) -> Result<Option<CandidateProfile>>;

    /// Every external id this campaign has ever attempted, any status.
    async fn attempted_external_ids(&self, campaign_id: Uuid) -> Result<HashSet<String>>;

    async fn insert_application(&self, row: &NewApplication) -> Result<()>;

    /// Adds `sent_delta` to `total_sent`, bumps `updated_at`, and flips the
    /// campaign to `completed` when `completed` is set.
    async fn finish_run(&self, campaign_id: Uuid, sent_delta: u32, completed: bool) -> Result<()>;

    /// Atomically claims the run marker. `false` means another invocation
    /// of this campaign is already in flight.
    async fn try_claim_run(&self, campaign_id: Uuid) -> Result<bool>;

    async fn release_run(&self, campaign_id: Uuid) -> Result<()>;

    /// All campaigns the scheduled trigger should process: active and not
    /// yet past `ends_at`.
    async fn active_campaigns(&self) -> Result<Vec<JobCampaign>>;

    /// Same filter, scoped to one candidate (the manual trigger).
    async fn active_campaigns_for(&self, owner: Uuid) -> Result<Vec<JobCampaign>>;
}

pub struct PgCampaignStore {
    pool: PgPool,
}

impl PgCampaignStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignStore for PgCampaignStore {
    async fn campaign(&self, id: Uuid, owner: Uuid) -> Result<Option<JobCampaign>> {
        let campaign: Option<JobCampaign> =
            sqlx::query_as("SELECT * FROM job_campaigns WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        Ok(campaign)
    }

    async fn profile(&self, owner: Uuid) -> Result<Option<CandidateProfile>> {
        let profile: Option<CandidateProfile> =
            sqlx::query_as("SELECT * FROM candidate_profiles WHERE user_id = $1")
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        Ok(profile)
    }

    async fn attempted_external_ids(&self, campaign_id: Uuid) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT target_external_id FROM campaign_applications WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn insert_application(&self, row: &NewApplication) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO campaign_applications
                (id, campaign_id, target_name, target_email, target_url, source,
                 target_external_id, cover_letter, status, error_message, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.campaign_id)
        .bind(&row.target_name)
        .bind(&row.target_email)
        .bind(&row.target_url)
        .bind(&row.source)
        .bind(&row.target_external_id)
        .bind(&row.cover_letter)
        .bind(row.status.as_str())
        .bind(&row.error_message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn finish_run(&self, campaign_id: Uuid, sent_delta: u32, completed: bool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_campaigns
            SET total_sent = total_sent + $2,
                status = CASE WHEN $3 THEN 'completed' ELSE status END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(campaign_id)
        .bind(sent_delta as i32)
        .bind(completed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn try_claim_run(&self, campaign_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE job_campaigns SET running = TRUE, updated_at = now() \
             WHERE id = $1 AND running = FALSE",
        )
        .bind(campaign_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_run(&self, campaign_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE job_campaigns SET running = FALSE WHERE id = $1")
            .bind(campaign_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn active_campaigns(&self) -> Result<Vec<JobCampaign>> {
        let campaigns: Vec<JobCampaign> = sqlx::query_as(
            "SELECT * FROM job_campaigns WHERE status = $1 AND ends_at >= now() \
             ORDER BY created_at",
        )
        .bind(CampaignStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(campaigns)
    }

    async fn active_campaigns_for(&self, owner: Uuid) -> Result<Vec<JobCampaign>> {
        let campaigns: Vec<JobCampaign> = sqlx::query_as(
            "SELECT * FROM job_campaigns \
             WHERE user_id = $1 AND status = $2 AND ends_at >= now() \
             ORDER BY created_at",
        )
        .bind(owner)
        .bind(CampaignStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(campaigns)
    }
}
