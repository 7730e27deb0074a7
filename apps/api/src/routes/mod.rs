pub mod health;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/analyses",
            get(handlers::handle_history).post(handlers::handle_analyze),
        )
        .route(
            "/api/v1/analyses/:id",
            get(handlers::handle_get_analysis).put(handlers::handle_update_analysis),
        )
        .route(
            "/api/v1/analyses/:id/confidence",
            patch(handlers::handle_update_confidence),
        )
        .with_state(state)
}
