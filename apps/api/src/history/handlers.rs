use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::screening::{JobScreeningResult, RankedCandidate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveScreeningRequest {
    pub job_role: String,
    pub job_description_name: String,
    pub candidates: Vec<RankedCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct JobRoleQuery {
    pub job_role: String,
}

/// POST /api/v1/screenings
pub async fn handle_save_screening(
    State(state): State<AppState>,
    Json(req): Json<SaveScreeningRequest>,
) -> Result<(StatusCode, Json<JobScreeningResult>), AppError> {
    let job_role = req.job_role.trim();
    if job_role.is_empty() {
        return Err(AppError::Validation("job_role cannot be empty".to_string()));
    }

    let saved = state
        .store
        .save(JobScreeningResult {
            id: Uuid::new_v4(),
            job_role: job_role.to_string(),
            job_description_name: req.job_description_name,
            candidates: req.candidates,
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/screenings?job_role=
pub async fn handle_list_screenings(
    State(state): State<AppState>,
    Query(params): Query<JobRoleQuery>,
) -> Result<Json<Vec<JobScreeningResult>>, AppError> {
    Ok(Json(state.store.list(params.job_role.trim()).await?))
}

/// GET /api/v1/screenings/:id
pub async fn handle_get_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobScreeningResult>, AppError> {
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Screening {id} not found")))
}
