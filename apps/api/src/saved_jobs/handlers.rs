use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{SavedJob, UNKNOWN_COMPANY};
use crate::profile::store::new_saved_job;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveJobRequest {
    pub title: String,
    pub company: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SaveJobRequest {
    fn into_job(self) -> Result<SavedJob, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        Ok(new_saved_job(
            title,
            non_blank(self.company).unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
            non_blank(self.url),
            non_blank(self.description),
        ))
    }
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<SavedJob>>, AppError> {
    Ok(Json(
        state.profiles_for(&user).saved_jobs(user.user_id).await?,
    ))
}

/// POST /api/v1/jobs
///
/// Saving the same url + title twice returns the already-saved record.
pub async fn handle_save_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SaveJobRequest>,
) -> Result<(StatusCode, Json<SavedJob>), AppError> {
    let job = req.into_job()?;
    let saved = state
        .profiles_for(&user)
        .add_saved_job(user.user_id, job)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .profiles_for(&user)
        .delete_saved_job(user.user_id, job_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, company: Option<&str>) -> SaveJobRequest {
        SaveJobRequest {
            title: title.to_string(),
            company: company.map(String::from),
            url: Some(" https://jobs.example.com/1 ".to_string()),
            description: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_company_defaults_to_unknown() {
        let job = request("Rust Engineer", None).into_job().unwrap();
        assert_eq!(job.company, UNKNOWN_COMPANY);
        let job = request("Rust Engineer", Some(" ")).into_job().unwrap();
        assert_eq!(job.company, UNKNOWN_COMPANY);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let job = request("  Rust Engineer ", Some("Acme")).into_job().unwrap();
        assert_eq!(job.title, "Rust Engineer");
        assert_eq!(job.url.as_deref(), Some("https://jobs.example.com/1"));
        assert!(job.description.is_none());
    }

    #[test]
    fn test_title_is_required() {
        assert!(matches!(
            request("   ", None).into_job(),
            Err(AppError::Validation(_))
        ));
    }
}
