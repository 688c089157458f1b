//! Route definitions for generation jobs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// POST   /generate        -> submit_generation
/// GET    /job/{job_id}    -> get_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generation::submit_generation))
        .route("/job/{job_id}", get(generation::get_job))
}
