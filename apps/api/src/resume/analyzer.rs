//! Resume analysis: ATS score, strengths, weaknesses and a rewritten resume.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::RESUME_REVIEWER_SYSTEM;
use crate::llm_client::{LlmClient, Part};
use crate::models::profile::clamp_score;
use crate::resume::prompts::{
    analysis_schema, ANALYZE_DOCUMENT_PROMPT, ANALYZE_TEXT_PROMPT_TEMPLATE,
};
use crate::resume::{document_part, ResumeContent};

/// Structured analysis returned by the model (camelCase in, snake_case out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct AnalysisResult {
    pub ats_score: f64,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    pub improvements: String,
    pub rewritten_resume: String,
}

impl AnalysisResult {
    pub fn clamped_score(&self) -> i32 {
        clamp_score(self.ats_score)
    }
}

pub fn analysis_parts(content: &ResumeContent) -> Vec<Part> {
    match content {
        ResumeContent::Document(document) => vec![
            document_part(document),
            Part::text(ANALYZE_DOCUMENT_PROMPT),
        ],
        ResumeContent::Text(text) => vec![Part::text(
            ANALYZE_TEXT_PROMPT_TEMPLATE.replace("{resume_text}", text),
        )],
    }
}

/// Sends the resume to the model and returns its schema-constrained analysis.
/// The ATS score is clamped to 0..=100.
pub async fn analyze_resume(
    content: &ResumeContent,
    llm: &LlmClient,
) -> Result<AnalysisResult, AppError> {
    let mut result: AnalysisResult = llm
        .call_json(
            analysis_parts(content),
            Some(RESUME_REVIEWER_SYSTEM),
            analysis_schema(),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Failed to analyze resume: {e}")))?;

    result.ats_score = result.clamped_score() as f64;
    Ok(result)
}
