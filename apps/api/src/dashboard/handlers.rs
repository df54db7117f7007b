use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::dashboard::{weekly_activity, DayActivity};
use crate::errors::AppError;
use crate::profile::current_profile;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub first_name: String,
    pub saved_jobs_count: usize,
    pub last_ats_score: Option<i32>,
    pub last_interview_date: Option<DateTime<Utc>>,
    pub weekly_activity: Vec<DayActivity>,
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let profile = current_profile(&state, &user).await?;

    Ok(Json(DashboardResponse {
        first_name: profile.first_name().to_string(),
        saved_jobs_count: profile.saved_jobs.len(),
        last_ats_score: profile.last_ats_score,
        last_interview_date: profile.last_interview_date,
        weekly_activity: weekly_activity(&profile.saved_jobs, Utc::now().date_naive()),
    }))
}
