//! Axum route handler for bulk resume ranking.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::info;

use crate::documents::DataUri;
use crate::errors::AppError;
use crate::models::screening::{JobDescription, Resume};
use crate::screening::orchestrator::BatchOrchestrator;
use crate::screening::partition::partition;
use crate::screening::stream::ndjson_response;
use crate::state::AppState;

/// Outcomes buffered between the orchestrator and a slow client.
const OUTCOME_BUFFER: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RankResumesRequest {
    pub job_description: JobDescription,
    pub resumes: Vec<Resume>,
}

/// POST /api/v1/screenings/rank
///
/// Streams one NDJSON record per settled batch: an array of ranked candidates,
/// or `{"error": "Batch Processing Error", "details": ...}` for a failed batch.
/// Anything wrong with the request itself is reported as a single non-streamed
/// 500 before any ranking starts.
pub async fn handle_rank_resumes(
    State(state): State<AppState>,
    payload: Result<Json<RankResumesRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Setup(e.body_text()))?;
    validate_request(&request)?;

    let resume_count = request.resumes.len();
    let batches = partition(request.resumes, state.config.batch_size);
    let job = Arc::new(request.job_description);

    info!(
        job = %job.name,
        resumes = resume_count,
        batches = batches.len(),
        "Starting bulk ranking"
    );

    let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
    let orchestrator = BatchOrchestrator::new(Arc::clone(&state.ranker), state.config.batch_timeout);
    tokio::spawn(async move {
        orchestrator.run(job, batches, tx).await;
    });

    Ok(ndjson_response(rx))
}

fn validate_request(request: &RankResumesRequest) -> Result<(), AppError> {
    let job = &request.job_description;
    if job.name.trim().is_empty() {
        return Err(AppError::Setup("job_description.name cannot be empty".to_string()));
    }
    DataUri::parse(&job.content)
        .map_err(|e| AppError::Setup(format!("job_description.content: {e}")))?;

    for (i, resume) in request.resumes.iter().enumerate() {
        if resume.name.trim().is_empty() {
            return Err(AppError::Setup(format!("resumes[{i}].name cannot be empty")));
        }
        DataUri::parse(&resume.content)
            .map_err(|e| AppError::Setup(format!("resumes[{i}] ('{}'): {e}", resume.name)))?;
    }

    Ok(())
}
