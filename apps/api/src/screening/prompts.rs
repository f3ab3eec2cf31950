// Prompt constants for bulk resume ranking.

/// Role half of the ranking system prompt; combined with the JSON-only rules.
pub const RANKING_ROLE: &str = "You are an expert technical recruiter and applicant \
    tracking system. You compare candidate resumes against a job description and score them.";

/// Ranking prompt template.
/// Replace: {fairness_instruction}, {job_name}, {job_text}, {resumes_block}, {resume_count}
pub const RANKING_PROMPT_TEMPLATE: &str = r#"{fairness_instruction}

JOB DESCRIPTION ({job_name}):
{job_text}

You are given {resume_count} resumes, each introduced by a header of the form
=== RESUME <resume_index>: <file name> ===

{resumes_block}

Return a JSON ARRAY with exactly one object per resume, using this EXACT schema:
[
  {
    "resume_index": 0,
    "candidate_name": "Full name as written on the resume",
    "match_score": 82,
    "ats_score": 74,
    "key_skills": ["Rust", "Distributed systems"],
    "feedback": "Two or three sentences on fit, strengths and gaps for this role."
  }
]

Rules:
- `resume_index` MUST be the index from the resume header. Use each index exactly once.
- `match_score` and `ats_score` are integers from 0 to 100.
- `key_skills` lists at most 8 skills relevant to this job.
- If the candidate name is not stated, use the file name without extension."#;

/// Header placed before each resume's text in the ranking prompt.
pub fn resume_header(index: usize, name: &str) -> String {
    format!("=== RESUME {index}: {name} ===")
}
