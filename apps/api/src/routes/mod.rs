pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::jobs::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs", get(handlers::handle_list_jobs))
        .route(
            "/api/v1/job",
            put(handlers::handle_upsert_job).delete(handlers::handle_delete_job),
        )
        .with_state(state)
}
