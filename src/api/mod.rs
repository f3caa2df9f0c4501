//! Thin HTTP glue over the core: routing for the REST control surface
//! described in spec §6. Grounded on
//! `examples/original_source/api/router.go` and the teacher's own
//! `axum::Router` construction in `src/main.rs`.

mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::pool::JobPool;

/// Matches `BasePath` in the original's `api/router.go`.
pub const BASE_PATH: &str = "/api/v1";

pub type AppState = Arc<JobPool>;

/// Builds the full router with the `/api/v1` prefix.
pub fn new_router(pool: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest(BASE_PATH, job_router(pool))
}

async fn root() -> &'static str {
    "use http://127.0.0.1:<port>/api/v1/ for more help"
}

fn job_router(pool: AppState) -> Router {
    Router::new()
        .route("/job", get(handlers::list_jobs).post(handlers::create_job))
        .route("/job/:id", get(handlers::get_job))
        .route("/job/:id/sse", get(handlers::job_sse))
        .route("/job/:id/cancel", post(handlers::cancel_job))
        .with_state(pool)
}
