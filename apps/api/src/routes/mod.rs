pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::history::handlers as history;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let rank_body_limit = DefaultBodyLimit::max(state.config.max_request_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Bulk ranking (streamed NDJSON)
        .route(
            "/api/v1/screenings/rank",
            post(screening::handle_rank_resumes).layer(rank_body_limit),
        )
        // Screening history
        .route(
            "/api/v1/screenings",
            post(history::handle_save_screening).get(history::handle_list_screenings),
        )
        .route("/api/v1/screenings/:id", get(history::handle_get_screening))
        // Single-document analysis
        .route(
            "/api/v1/job-roles/extract",
            post(analysis::handle_extract_job_roles),
        )
        .route("/api/v1/ats-score", post(analysis::handle_ats_score))
        .route(
            "/api/v1/interview-questions",
            post(analysis::handle_interview_questions),
        )
        .with_state(state)
}
