//! Axum route handlers for the analysis API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::analysis::ats::{score_resume, AtsReport};
use crate::analysis::interview::{
    effective_count, generate_questions, CandidateProfile, InterviewQuestions,
};
use crate::analysis::job_roles::{extract_job_roles, JobRoles};
use crate::errors::AppError;
use crate::models::screening::{JobDescription, Resume};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobRolesRequest {
    pub job_description: JobDescription,
}

#[derive(Debug, Deserialize)]
pub struct AtsScoreRequest {
    pub resume: Resume,
    pub job_description: Option<JobDescription>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub job_description: JobDescription,
    pub candidate: CandidateProfile,
    pub count: Option<usize>,
}

/// POST /api/v1/job-roles/extract
pub async fn handle_extract_job_roles(
    State(state): State<AppState>,
    Json(req): Json<JobRolesRequest>,
) -> Result<Json<JobRoles>, AppError> {
    Ok(Json(extract_job_roles(&req.job_description, &state.llm).await?))
}

/// POST /api/v1/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Json(req): Json<AtsScoreRequest>,
) -> Result<Json<AtsReport>, AppError> {
    let report = score_resume(&req.resume, req.job_description.as_ref(), &state.llm).await?;
    Ok(Json(report))
}

/// POST /api/v1/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(req): Json<InterviewQuestionsRequest>,
) -> Result<Json<InterviewQuestions>, AppError> {
    if req.candidate.name.trim().is_empty() {
        return Err(AppError::Validation("candidate.name cannot be empty".to_string()));
    }

    let count = effective_count(req.count);
    let questions =
        generate_questions(&req.job_description, &req.candidate, count, &state.llm).await?;
    Ok(Json(questions))
}
