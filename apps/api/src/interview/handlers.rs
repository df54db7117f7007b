use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::interview::coach::{answer, start_session};
use crate::interview::{ChatMessage, InterviewSession, SessionView};
use crate::models::profile::{ProfileUpdate, DEFAULT_TARGET_ROLE};
use crate::profile::current_profile;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StartInterviewRequest {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub reply: ChatMessage,
    pub session: SessionView,
}

/// First non-blank of: requested role, profile target role, default role.
fn interview_role(requested: Option<&str>, target_role: &str) -> String {
    [requested.unwrap_or(""), target_role]
        .into_iter()
        .map(str::trim)
        .find(|r| !r.is_empty())
        .unwrap_or(DEFAULT_TARGET_ROLE)
        .to_string()
}

async fn owned_session(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<InterviewSession, AppError> {
    state
        .interviews_for(user)
        .load(id)
        .await?
        .filter(|s| s.owner == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))
}

/// POST /api/v1/interview/sessions
///
/// Starts a mock interview and stamps the profile's last interview date.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    user: AuthUser,
    body: Option<Json<StartInterviewRequest>>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let profile = current_profile(&state, &user).await?;
    let role = interview_role(req.role.as_deref(), &profile.target_role);

    let session = start_session(&state.llm, user.user_id, &role).await;
    state.interviews_for(&user).save(&session).await?;
    state
        .profiles_for(&user)
        .apply_update(user.user_id, &ProfileUpdate::interview_started(Utc::now()))
        .await?;

    info!(
        "Started interview {} for user {} ({role})",
        session.id, user.user_id
    );
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /api/v1/interview/sessions/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(owned_session(&state, &user, id).await?.into()))
}

/// POST /api/v1/interview/sessions/:id/messages
pub async fn handle_answer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("Message text cannot be empty".to_string()));
    }
    let mut session = owned_session(&state, &user, id).await?;

    let reply = answer(&state.llm, &mut session, &req.text).await?;
    state.interviews_for(&user).save(&session).await?;

    Ok(Json(AnswerResponse {
        reply,
        session: session.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_prefers_request() {
        assert_eq!(interview_role(Some(" PM "), "Engineer"), "PM");
    }

    #[test]
    fn test_role_falls_back_to_profile_then_default() {
        assert_eq!(interview_role(Some("  "), "Engineer"), "Engineer");
        assert_eq!(interview_role(None, ""), "Job Seeker");
    }
}
