// Job Matcher: scores a resume against a pasted job description.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::{LlmClient, Part};
use crate::matcher::prompts::{match_prompt, match_schema, RESUME_TEXT_PREFIX};
use crate::models::profile::{clamp_score, UNKNOWN_COMPANY};
use crate::resume::{document_part, ResumeContent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct JobMatchResult {
    pub match_score: f64,
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    pub analysis: String,
    pub cultural_fit: String,
}

pub fn match_parts(resume: &ResumeContent, job_description: &str) -> Vec<Part> {
    let prompt = match_prompt(job_description);
    match resume {
        ResumeContent::Document(document) => vec![document_part(document), Part::text(prompt)],
        ResumeContent::Text(text) => vec![Part::text(format!(
            "{RESUME_TEXT_PREFIX}{text}\n\n{prompt}"
        ))],
    }
}

/// Compares a resume with a job description. The score is clamped to 0..=100 and a
/// blank company becomes "Unknown Company".
pub async fn match_job(
    resume: &ResumeContent,
    job_description: &str,
    llm: &LlmClient,
) -> Result<JobMatchResult, AppError> {
    let result: JobMatchResult = llm
        .call_json(match_parts(resume, job_description), None, match_schema())
        .await
        .map_err(|e| AppError::Llm(format!("Failed to match job: {e}")))?;

    Ok(normalize(result))
}

fn normalize(mut result: JobMatchResult) -> JobMatchResult {
    result.match_score = clamp_score(result.match_score) as f64;
    if result.company.trim().is_empty() {
        result.company = UNKNOWN_COMPANY.to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const JD: &str = "Senior Rust Engineer at Acme. Required: tokio, axum.";

    #[test]
    fn test_text_resume_is_prefixed() {
        let parts = match_parts(&ResumeContent::Text("Rust, 5 years".into()), JD);
        assert_eq!(parts.len(), 1);
        let text = parts[0].as_text().unwrap();
        assert!(text.starts_with("Resume Text:\nRust, 5 years\n\n"));
        assert!(text.contains(JD));
        assert!(text.contains("identify missing keywords"));
    }

    #[test]
    fn test_document_resume_is_attached() {
        let parts = match_parts(&ResumeContent::Document(Bytes::from_static(b"%PDF-1.7")), JD);
        assert_eq!(parts.len(), 2);
        assert!(parts[1].as_text().unwrap().contains(JD));
    }

    #[test]
    fn test_normalize_clamps_and_fills_company() {
        let raw: JobMatchResult = serde_json::from_str(
            r#"{
                "matchScore": -5,
                "jobTitle": "Senior Rust Engineer",
                "company": "",
                "missingKeywords": ["kubernetes"],
                "analysis": "Good overlap.",
                "culturalFit": "Strong."
            }"#,
        )
        .unwrap();
        let result = normalize(raw);
        assert_eq!(result.match_score, 0.0);
        assert_eq!(result.company, UNKNOWN_COMPANY);
        assert_eq!(result.missing_keywords, vec!["kubernetes".to_string()]);
    }
}
