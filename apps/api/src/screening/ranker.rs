//! Ranking capability — scores one batch of resumes against a job description.
//!
//! The orchestrator only sees the [`ResumeRanker`] trait. `AppState` carries an
//! `Arc<dyn ResumeRanker>`; production uses [`LlmResumeRanker`], tests plug in
//! scripted rankers.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::documents::{text_from_uri, DocumentError};
use crate::llm_client::prompts::{fill_template, json_system, FAIRNESS_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::screening::{JobDescription, RankedCandidate, Resume};
use crate::screening::prompts::{resume_header, RANKING_PROMPT_TEMPLATE, RANKING_ROLE};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("could not read '{name}': {source}")]
    Document {
        name: String,
        #[source]
        source: DocumentError,
    },

    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("ranking referenced unknown resume index {0}")]
    UnknownResume(usize),

    #[error("ranking returned resume index {0} more than once")]
    DuplicateResume(usize),

    #[error("ranking covered {ranked} of {expected} resumes")]
    Incomplete { ranked: usize, expected: usize },

    #[error("ranking timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("ranking task failed: {0}")]
    Task(String),
}

/// Ranks a batch of resumes against a job description.
///
/// Implementations return one candidate per resume, or an empty list when
/// there is nothing to report. They never return candidates for resumes
/// outside the batch.
#[async_trait]
pub trait ResumeRanker: Send + Sync {
    async fn rank(
        &self,
        job: &JobDescription,
        batch: &[Resume],
    ) -> Result<Vec<RankedCandidate>, RankingError>;
}

/// Claude-backed ranker.
pub struct LlmResumeRanker {
    llm: LlmClient,
}

impl LlmResumeRanker {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeRanker for LlmResumeRanker {
    async fn rank(
        &self,
        job: &JobDescription,
        batch: &[Resume],
    ) -> Result<Vec<RankedCandidate>, RankingError> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        // PDF extraction is CPU-bound; keep it off the async workers.
        let owned_job = job.clone();
        let owned_batch = batch.to_vec();
        let prompt = tokio::task::spawn_blocking(move || build_prompt(&owned_job, &owned_batch))
            .await
            .map_err(|e| RankingError::Task(e.to_string()))??;

        let entries: Vec<RankingEntry> = self
            .llm
            .call_json(&prompt, &json_system(RANKING_ROLE))
            .await?;

        debug!(
            job = %job.name,
            resumes = batch.len(),
            ranked = entries.len(),
            "LLM ranking returned"
        );

        assemble_candidates(batch, entries)
    }
}

/// One row of the model's ranking output.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingEntry {
    pub resume_index: usize,
    pub candidate_name: String,
    pub match_score: f64,
    pub ats_score: f64,
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default)]
    pub feedback: String,
}

fn build_prompt(job: &JobDescription, batch: &[Resume]) -> Result<String, RankingError> {
    let job_text = text_from_uri(&job.content).map_err(|source| RankingError::Document {
        name: job.name.clone(),
        source,
    })?;

    let mut resumes_block = String::new();
    for (index, resume) in batch.iter().enumerate() {
        let text = text_from_uri(&resume.content).map_err(|source| RankingError::Document {
            name: resume.name.clone(),
            source,
        })?;
        resumes_block.push_str(&resume_header(index, &resume.name));
        resumes_block.push('\n');
        resumes_block.push_str(&text);
        resumes_block.push_str("\n\n");
    }

    let resume_count = batch.len().to_string();
    Ok(fill_template(
        RANKING_PROMPT_TEMPLATE,
        &[
            ("fairness_instruction", FAIRNESS_INSTRUCTION),
            ("job_name", job.name.as_str()),
            ("resume_count", resume_count.as_str()),
            ("job_text", job_text.as_str()),
            ("resumes_block", resumes_block.trim_end()),
        ],
    ))
}

/// Joins model output back onto the batch's resumes.
///
/// Each entry must point at a distinct resume of the batch, and a non-empty
/// answer must cover all of them. Output is sorted by match score, best first.
pub fn assemble_candidates(
    batch: &[Resume],
    entries: Vec<RankingEntry>,
) -> Result<Vec<RankedCandidate>, RankingError> {
    if entries.is_empty() {
        return Ok(vec![]);
    }

    let mut seen = vec![false; batch.len()];
    let mut candidates = Vec::with_capacity(entries.len());

    for entry in entries {
        let resume = batch
            .get(entry.resume_index)
            .ok_or(RankingError::UnknownResume(entry.resume_index))?;
        if std::mem::replace(&mut seen[entry.resume_index], true) {
            return Err(RankingError::DuplicateResume(entry.resume_index));
        }

        candidates.push(RankedCandidate {
            id: resume.id.clone(),
            name: entry.candidate_name,
            match_score: clamp_score(entry.match_score),
            ats_score: clamp_score(entry.ats_score),
            key_skills: entry.key_skills,
            feedback: entry.feedback,
            resume_name: resume.name.clone(),
            resume_content: resume.content.clone(),
        });
    }

    if candidates.len() != batch.len() {
        return Err(RankingError::Incomplete {
            ranked: candidates.len(),
            expected: batch.len(),
        });
    }

    candidates.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    Ok(candidates)
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}
