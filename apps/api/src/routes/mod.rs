pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::campaigns::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Campaign triggers
        .route(
            "/api/v1/campaigns/run-scheduled",
            post(handlers::handle_run_scheduled),
        )
        .route("/api/v1/campaigns/run", post(handlers::handle_run_manual))
        .with_state(state)
}
