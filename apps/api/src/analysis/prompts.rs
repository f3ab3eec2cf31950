// Prompt constants for single-document analysis: role extraction, ATS
// scoring and interview question generation.

pub const JOB_ROLES_ROLE: &str =
    "You are an expert recruiter who reads job descriptions and identifies the distinct roles they advertise.";

/// Replace: {job_name}, {job_text}
pub const JOB_ROLES_PROMPT_TEMPLATE: &str = r#"Identify every distinct job role advertised in the job description below.
Most descriptions advertise one role; some list several openings.

Return a JSON object with this EXACT schema:
{
  "roles": [
    {
      "title": "Senior Backend Engineer",
      "summary": "One sentence describing the role",
      "required_skills": ["Rust", "PostgreSQL"],
      "seniority": "senior"
    }
  ]
}

SENIORITY: "intern", "junior", "mid", "senior", "staff", "principal", "manager", "director", or "unknown".

JOB DESCRIPTION ({job_name}):
{job_text}"#;

pub const ATS_ROLE: &str = "You are an applicant tracking system auditor. You judge how well a \
    resume will be parsed and matched by automated screening software.";

/// Replace: {resume_name}, {resume_text}, {job_section}
pub const ATS_PROMPT_TEMPLATE: &str = r#"Score the resume below for ATS compatibility.
Consider parseable structure, standard section headings, contact details, keyword coverage,
consistent dates, and absence of tables, images or multi-column layouts that break parsers.
{job_section}
Return a JSON object with this EXACT schema:
{
  "score": 78,
  "strengths": ["Clear section headings"],
  "issues": ["Dates use inconsistent formats"],
  "suggestions": ["Use MM/YYYY for all dates"]
}

`score` is an integer from 0 to 100.

RESUME ({resume_name}):
{resume_text}"#;

/// Inserted into the ATS prompt when a job description is supplied.
/// Replace: {job_name}, {job_text}
pub const ATS_JOB_SECTION_TEMPLATE: &str = r#"
Also judge keyword coverage against this job description ({job_name}):
{job_text}
"#;

pub const INTERVIEW_ROLE: &str =
    "You are a hiring manager preparing a structured interview for a specific candidate.";

/// Replace: {count}, {job_name}, {job_text}, {candidate_name}, {key_skills}, {feedback}
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"Write {count} interview questions for the candidate below.
Probe the gaps named in the screening feedback as well as the candidate's claimed strengths.
Mix technical, behavioral and situational questions.

Return a JSON object with this EXACT schema:
{
  "questions": [
    {
      "question": "Walk me through how you would shard the ingestion pipeline",
      "category": "technical",
      "rationale": "Resume claims distributed systems work but gives no scale figures"
    }
  ]
}

`category` is one of "technical", "behavioral", "situational", "culture".

JOB DESCRIPTION ({job_name}):
{job_text}

CANDIDATE: {candidate_name}
KEY SKILLS: {key_skills}
SCREENING FEEDBACK: {feedback}"#;
