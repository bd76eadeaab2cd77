use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Only `DATABASE_URL` is required at startup. Provider credentials, the
/// sender identity, the generation API key, and the scheduled-trigger secret
/// are all optional: a missing credential degrades the component that needs
/// it at call time (connectors yield nothing, the dispatcher reports a
/// structured failure) rather than preventing boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Shared secret for the scheduled trigger. `None` leaves it open.
    pub cron_secret: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub resend_api_key: Option<String>,
    /// Verified sender identity, e.g. `"Canvass <campaigns@canvass.app>"`.
    pub sender_identity: Option<String>,
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub france_travail_client_id: Option<String>,
    pub france_travail_client_secret: Option<String>,
    pub jooble_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cron_secret: optional_env("CRON_SECRET"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            resend_api_key: optional_env("RESEND_API_KEY"),
            sender_identity: optional_env("SENDER_IDENTITY"),
            adzuna_app_id: optional_env("ADZUNA_APP_ID"),
            adzuna_app_key: optional_env("ADZUNA_APP_KEY"),
            france_travail_client_id: optional_env("FRANCE_TRAVAIL_CLIENT_ID"),
            france_travail_client_secret: optional_env("FRANCE_TRAVAIL_CLIENT_SECRET"),
            jooble_api_key: optional_env("JOOBLE_API_KEY"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats unset and empty the same — an empty credential is no credential.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
