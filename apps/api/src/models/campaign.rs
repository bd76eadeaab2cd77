#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Campaign lifecycle states. Stored as text in `job_campaigns.status`.
///
/// The runner only ever performs `active → completed` (on expiry).
/// `paused`, `cancelled`, and resuming are candidate actions outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(CampaignStatus::Active),
            "paused" => Some(CampaignStatus::Paused),
            "completed" => Some(CampaignStatus::Completed),
            "cancelled" => Some(CampaignStatus::Cancelled),
            _ => None,
        }
    }
}

/// A time-boxed, quota-bounded automated application campaign.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobCampaign {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub duration_days: i32,
    /// Computed at creation as `created_at + duration_days`.
    pub ends_at: DateTime<Utc>,
    pub max_applications_per_day: i32,
    /// Monotonic; always equals the count of `sent` application rows.
    pub total_sent: i32,
    /// Run-lock marker: set while one invocation of this campaign is in
    /// flight so a concurrent second invocation no-ops.
    pub running: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobCampaign {
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active.as_str()
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.ends_at <= now
    }
}

/// Outcome status of one application attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Sent,
    Failed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Sent => "sent",
            ApplicationStatus::Failed => "failed",
        }
    }
}

/// Persisted outcome of one application attempt — exactly one row per
/// attempted listing per campaign, whatever the outcome was.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampaignApplication {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub target_name: String,
    pub target_email: String,
    pub target_url: String,
    pub source: String,
    /// Provider-assigned listing id; the per-campaign dedup key.
    pub target_external_id: String,
    pub cover_letter: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
