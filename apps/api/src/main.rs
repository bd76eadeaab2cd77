mod campaigns;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod mailer;
mod matching;
mod models;
mod routes;
mod sources;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::campaigns::runner::CampaignDeps;
use crate::campaigns::store::PgCampaignStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::generation::letter::LlmLetterGenerator;
use crate::llm_client::LlmClient;
use crate::mailer::ResendMailer;
use crate::routes::build_router;
use crate::sources::adzuna::AdzunaConnector;
use crate::sources::france_travail::FranceTravailConnector;
use crate::sources::jooble::JoobleConnector;
use crate::sources::JobSourceConnector;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (only DATABASE_URL is required)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Canvass API v{}", env!("CARGO_PKG_VERSION"));

    if config.cron_secret.is_none() {
        warn!("CRON_SECRET is not set — the scheduled trigger will accept any caller");
    }

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgCampaignStore::new(pool));

    // Source connectors, in dedup priority order. Each one degrades to an
    // empty result when its credentials are missing.
    let connectors: Vec<Arc<dyn JobSourceConnector>> = vec![
        Arc::new(FranceTravailConnector::new(
            config.france_travail_client_id.clone(),
            config.france_travail_client_secret.clone(),
        )),
        Arc::new(AdzunaConnector::new(
            config.adzuna_app_id.clone(),
            config.adzuna_app_key.clone(),
        )),
        Arc::new(JoobleConnector::new(config.jooble_api_key.clone())),
    ];
    info!("{} source connectors configured", connectors.len());

    // Letter generation via the LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    let generator = Arc::new(LlmLetterGenerator::new(llm));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Email dispatch
    let sender = Arc::new(ResendMailer::new(
        config.resend_api_key.clone(),
        config.sender_identity.clone(),
    ));

    // Bundle the runner's collaborators
    let deps = Arc::new(CampaignDeps {
        store,
        connectors,
        generator,
        sender,
    });

    let state = AppState {
        deps,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
