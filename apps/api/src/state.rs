use std::sync::Arc;

use crate::campaigns::runner::CampaignDeps;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// `deps` bundles the runner's collaborators (store, connectors, generator,
/// sender) behind their traits; handlers never touch concrete clients.
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<CampaignDeps>,
    pub config: Config,
}
