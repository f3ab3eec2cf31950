// Single-document analysis endpoints: job role extraction, ATS scoring and
// interview questions. All LLM calls go through llm_client.

pub mod ats;
pub mod handlers;
pub mod interview;
pub mod job_roles;
pub mod prompts;
