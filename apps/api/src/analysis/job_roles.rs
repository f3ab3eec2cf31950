//! Job role extraction — lists the roles a job description advertises.

use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{JOB_ROLES_PROMPT_TEMPLATE, JOB_ROLES_ROLE};
use crate::documents::read_text;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::models::screening::JobDescription;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRole {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default = "unknown_seniority")]
    pub seniority: String,
}

fn unknown_seniority() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRoles {
    pub roles: Vec<JobRole>,
}

pub async fn extract_job_roles(job: &JobDescription, llm: &LlmClient) -> Result<JobRoles, AppError> {
    let job_text = read_text(&job.content).await?;
    let prompt = fill_template(
        JOB_ROLES_PROMPT_TEMPLATE,
        &[("job_name", job.name.as_str()), ("job_text", job_text.as_str())],
    );

    let raw: JobRoles = llm
        .call_json(&prompt, &json_system(JOB_ROLES_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Job role extraction failed: {e}")))?;

    normalize_roles(raw)
}

/// Drops untitled roles and merges duplicates by case-insensitive title.
fn normalize_roles(raw: JobRoles) -> Result<JobRoles, AppError> {
    let mut roles: Vec<JobRole> = Vec::with_capacity(raw.roles.len());

    for mut role in raw.roles {
        role.title = role.title.trim().to_string();
        if role.title.is_empty() {
            continue;
        }
        match roles
            .iter_mut()
            .find(|r| r.title.eq_ignore_ascii_case(&role.title))
        {
            Some(existing) => {
                for skill in role.required_skills {
                    if !existing
                        .required_skills
                        .iter()
                        .any(|s| s.eq_ignore_ascii_case(&skill))
                    {
                        existing.required_skills.push(skill);
                    }
                }
            }
            None => roles.push(role),
        }
    }

    if roles.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No job roles could be identified in the job description".to_string(),
        ));
    }

    Ok(JobRoles { roles })
}
