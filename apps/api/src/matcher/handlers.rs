use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::matcher::{match_job, JobMatchResult};
use crate::profile::current_profile;
use crate::resume::ResumeContent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job_description: String,
    pub resume_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    #[serde(flatten)]
    pub result: JobMatchResult,
    /// 100 - match_score, for the match/gap chart.
    pub gap: f64,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let profile = current_profile(&state, &user).await?;
    let document = state
        .profiles_for(&user)
        .resume_document(user.user_id)
        .await?;
    let resume = ResumeContent::pick(
        document,
        [
            req.resume_text.as_deref().unwrap_or(""),
            profile.resume_text.as_str(),
        ],
    )
    .ok_or_else(|| AppError::Validation("No resume content provided".to_string()))?;

    let result = match_job(&resume, req.job_description.trim(), &state.llm).await?;
    let gap = 100.0 - result.match_score;

    Ok(Json(MatchResponse { result, gap }))
}
