//! ATS compatibility scoring for a single resume, optionally against a job description.

use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{ATS_JOB_SECTION_TEMPLATE, ATS_PROMPT_TEMPLATE, ATS_ROLE};
use crate::documents::read_text;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::models::screening::{JobDescription, Resume};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsReport {
    /// 0 – 100
    pub score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

pub async fn score_resume(
    resume: &Resume,
    job: Option<&JobDescription>,
    llm: &LlmClient,
) -> Result<AtsReport, AppError> {
    let resume_text = read_text(&resume.content).await?;
    let job_section = match job {
        Some(job) => {
            let job_text = read_text(&job.content).await?;
            fill_template(
                ATS_JOB_SECTION_TEMPLATE,
                &[("job_name", job.name.as_str()), ("job_text", job_text.as_str())],
            )
        }
        None => String::new(),
    };

    let prompt = ats_prompt(&resume.name, &resume_text, &job_section);

    let report: AtsReport = llm
        .call_json(&prompt, &json_system(ATS_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("ATS scoring failed: {e}")))?;

    Ok(report.normalized())
}

// The job section is inserted first; resume text is never rescanned.
fn ats_prompt(resume_name: &str, resume_text: &str, job_section: &str) -> String {
    fill_template(
        ATS_PROMPT_TEMPLATE,
        &[
            ("job_section", job_section),
            ("resume_name", resume_name),
            ("resume_text", resume_text),
        ],
    )
}

impl AtsReport {
    fn normalized(mut self) -> Self {
        self.score = if self.score.is_nan() {
            0.0
        } else {
            self.score.clamp(0.0, 100.0).round()
        };
        for list in [&mut self.strengths, &mut self.issues, &mut self.suggestions] {
            list.retain(|s| !s.trim().is_empty());
        }
        self
    }
}
