//! Interview question generation for a screened candidate.

use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{INTERVIEW_PROMPT_TEMPLATE, INTERVIEW_ROLE};
use crate::documents::read_text;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::models::screening::JobDescription;

pub const DEFAULT_QUESTION_COUNT: usize = 8;
pub const MAX_QUESTION_COUNT: usize = 20;

/// The parts of a ranked candidate the question generator needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub rationale: String,
}

fn default_category() -> String {
    "technical".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestions {
    pub questions: Vec<InterviewQuestion>,
}

/// Clamps a requested question count into `1..=MAX_QUESTION_COUNT`.
pub fn effective_count(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT)
}

pub async fn generate_questions(
    job: &JobDescription,
    candidate: &CandidateProfile,
    count: usize,
    llm: &LlmClient,
) -> Result<InterviewQuestions, AppError> {
    let job_text = read_text(&job.content).await?;
    let prompt = interview_prompt(job, &job_text, candidate, count);

    let generated: InterviewQuestions = llm
        .call_json(&prompt, &json_system(INTERVIEW_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Interview question generation failed: {e}")))?;

    Ok(trim_questions(generated, count))
}

fn interview_prompt(
    job: &JobDescription,
    job_text: &str,
    candidate: &CandidateProfile,
    count: usize,
) -> String {
    let key_skills = if candidate.key_skills.is_empty() {
        "(none listed)".to_string()
    } else {
        candidate.key_skills.join(", ")
    };
    let count = count.to_string();

    fill_template(
        INTERVIEW_PROMPT_TEMPLATE,
        &[
            ("count", count.as_str()),
            ("candidate_name", candidate.name.as_str()),
            ("key_skills", key_skills.as_str()),
            ("feedback", candidate.feedback.as_str()),
            ("job_name", job.name.as_str()),
            ("job_text", job_text),
        ],
    )
}

fn trim_questions(mut generated: InterviewQuestions, count: usize) -> InterviewQuestions {
    generated.questions.retain(|q| !q.question.trim().is_empty());
    generated.questions.truncate(count);
    generated
}
