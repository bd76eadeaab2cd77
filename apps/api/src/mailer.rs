//! Email dispatch — trait-based sender with a Resend-backed default.
//!
//! The contract mirrors the connectors': `send` never returns `Err`. Missing
//! configuration is rejected before any network I/O, and transport or
//! provider failures come back as a structured `SendOutcome` for the caller
//! to record.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// One application email, fully assembled by the runner.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Candidate reply context; recruiters answer the candidate, not us.
    pub reply_to: String,
}

/// Structured dispatch result. `ok == true` implies a provider message id.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub ok: bool,
    pub id: Option<String>,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn sent(id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// The dispatcher seam. Carried in `CampaignDeps` as `Arc<dyn EmailSender>`.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> SendOutcome;
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    reply_to: &'a str,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

/// Resend REST sender. Credentials and the verified sender identity are
/// optional at construction; their absence surfaces per send, not at boot.
pub struct ResendMailer {
    client: Client,
    api_key: Option<String>,
    sender_identity: Option<String>,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>, sender_identity: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            sender_identity,
        }
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> SendOutcome {
        // Pre-flight: every structural problem is reported without a network call.
        let Some(api_key) = self.api_key.as_deref() else {
            return SendOutcome::failed("email sending is not configured (no API key)");
        };
        let Some(sender) = self.sender_identity.as_deref() else {
            return SendOutcome::failed("no verified sender identity configured");
        };
        if email.to.trim().is_empty() {
            return SendOutcome::failed("no recipient address");
        }
        if email.reply_to.trim().is_empty() {
            return SendOutcome::failed("no candidate reply address");
        }

        let request = ResendRequest {
            from: sender,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            reply_to: &email.reply_to,
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("Email dispatch to {} failed in transport: {e}", email.to);
                return SendOutcome::failed(format!("transport error: {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Email provider rejected send to {}: {status} {body}", email.to);
            return SendOutcome::failed(format!("provider rejected ({status}): {body}"));
        }

        match response.json::<ResendResponse>().await {
            Ok(parsed) => SendOutcome::sent(parsed.id),
            Err(e) => SendOutcome::failed(format!("unreadable provider response: {e}")),
        }
    }
}
