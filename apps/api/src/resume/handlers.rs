use anyhow::Context;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::ProfileUpdate;
use crate::profile::current_profile;
use crate::resume::analyzer::{analyze_resume, AnalysisResult};
use crate::resume::pdf::{render_improved_resume, IMPROVED_RESUME_FILENAME};
use crate::resume::prompts::EXTRACTED_SUMMARY_PREFIX;
use crate::resume::ResumeContent;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzeSource {
    /// The uploaded PDF.
    Document,
    /// Request text, falling back to the stored resume text.
    Text,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub source: AnalyzeSource,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: AnalysisResult,
    /// True when the analysis summary was written into an empty resume text.
    pub resume_text_filled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ImprovedPdfRequest {
    pub rewritten_resume: String,
}

/// Resume text to store after an analysis: the PDF summary, prefixed, but only
/// when the PDF was analyzed and no resume text is stored yet.
pub fn summary_fill(content: &ResumeContent, stored_text: &str, summary: &str) -> Option<String> {
    let summary = summary.trim();
    (matches!(content, ResumeContent::Document(_))
        && stored_text.trim().is_empty()
        && !summary.is_empty())
    .then(|| format!("{EXTRACTED_SUMMARY_PREFIX}{summary}"))
}

/// POST /api/v1/resume/analyze
///
/// Scores the resume, records the ATS score on the profile and, for a PDF with
/// no stored text, keeps the summary as the resume text.
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let profile = current_profile(&state, &user).await?;
    let store = state.profiles_for(&user);

    let content = match req.source {
        AnalyzeSource::Document => store
            .resume_document(user.user_id)
            .await?
            .map(ResumeContent::Document),
        AnalyzeSource::Text => ResumeContent::pick(
            None,
            [req.text.as_deref().unwrap_or(""), profile.resume_text.as_str()],
        ),
    }
    .ok_or_else(|| AppError::Validation("No content provided".to_string()))?;

    let analysis = analyze_resume(&content, &state.llm).await?;
    let score = analysis.clamped_score();

    store
        .apply_update(user.user_id, &ProfileUpdate::ats_score(score))
        .await?;
    info!("Recorded ATS score {score} for user {}", user.user_id);

    let fill = summary_fill(&content, &profile.resume_text, &analysis.summary);
    let resume_text_filled = fill.is_some();
    if let Some(text) = fill {
        store
            .apply_update(user.user_id, &ProfileUpdate::resume_text(text))
            .await?;
    }

    Ok(Json(AnalyzeResponse {
        analysis,
        resume_text_filled,
    }))
}

/// POST /api/v1/resume/improved-pdf
///
/// Renders the rewritten resume as "Improved_Resume.pdf".
pub async fn handle_improved_pdf(
    user: AuthUser,
    Json(req): Json<ImprovedPdfRequest>,
) -> Result<Response, AppError> {
    if req.rewritten_resume.trim().is_empty() {
        return Err(AppError::Validation("rewritten_resume cannot be empty".to_string()));
    }

    let text = req.rewritten_resume;
    let pdf = tokio::task::spawn_blocking(move || render_improved_resume(&text))
        .await
        .context("PDF rendering task failed")??;
    info!("Rendered improved resume ({} bytes) for user {}", pdf.len(), user.user_id);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{IMPROVED_RESUME_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn document() -> ResumeContent {
        ResumeContent::Document(Bytes::from_static(b"%PDF-1.7"))
    }

    #[test]
    fn test_summary_fills_empty_text_after_pdf_analysis() {
        assert_eq!(
            summary_fill(&document(), "  ", " Strong frontend profile. ").as_deref(),
            Some("[Extracted Summary from PDF]: Strong frontend profile.")
        );
    }

    #[test]
    fn test_summary_never_overwrites_or_fills_from_text() {
        assert!(summary_fill(&document(), "existing resume", "Summary").is_none());
        assert!(summary_fill(&ResumeContent::Text("cv".into()), "", "Summary").is_none());
        assert!(summary_fill(&document(), "", "   ").is_none());
    }
}
