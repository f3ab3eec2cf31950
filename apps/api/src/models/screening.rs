use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

/// A candidate resume as uploaded. `content` is a data URI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resume {
    #[serde(default = "generated_id")]
    pub id: String,
    pub name: String,
    pub content: String,
}

/// The job description a batch of resumes is ranked against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobDescription {
    pub name: String,
    pub content: String,
}

/// One ranked resume. Always traceable to exactly one input [`Resume`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    /// Id of the originating resume.
    pub id: String,
    /// Candidate name as read from the resume.
    pub name: String,
    pub match_score: f64,
    pub ats_score: f64,
    pub key_skills: Vec<String>,
    pub feedback: String,
    pub resume_name: String,
    pub resume_content: String,
}

/// A finished screening persisted to history, grouped by job role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobScreeningResult {
    pub id: Uuid,
    pub job_role: String,
    pub job_description_name: String,
    pub candidates: Vec<RankedCandidate>,
    pub created_at: DateTime<Utc>,
}
