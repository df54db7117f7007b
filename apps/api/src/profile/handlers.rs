use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::accounts::normalize_email;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{ProfileUpdate, UserProfile};
use crate::profile::current_profile;
use crate::profile::upload::{extract_text, validate_pdf};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResumeTextRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub profile: UserProfile,
    /// True when text extracted from the PDF became the stored resume text.
    pub resume_text_filled: bool,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(current_profile(&state, &user).await?))
}

/// PATCH /api/v1/profile
///
/// Updates name, email and target role. Blank fields are left untouched.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    if let Some(email) = update.email().map(normalize_email).transpose()? {
        update.email = Some(email);
    }

    // Make sure the row exists so blank fields keep their defaults.
    current_profile(&state, &user).await?;
    state
        .profiles_for(&user)
        .apply_update(user.user_id, &update)
        .await?;

    Ok(Json(current_profile(&state, &user).await?))
}

/// PUT /api/v1/profile/resume-text
pub async fn handle_put_resume_text(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ResumeTextRequest>,
) -> Result<Json<UserProfile>, AppError> {
    current_profile(&state, &user).await?;
    state
        .profiles_for(&user)
        .apply_update(user.user_id, &ProfileUpdate::resume_text(req.text))
        .await?;

    Ok(Json(current_profile(&state, &user).await?))
}

/// POST /api/v1/profile/resume?overwrite=bool
///
/// Multipart upload, field `file`. Replacing an existing document requires
/// `overwrite=true`; without it the call answers 409 so the client can confirm.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) =
        upload.ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))?;
    validate_pdf(content_type.as_deref(), &data)?;

    let profile = current_profile(&state, &user).await?;
    if profile.has_resume_document && !query.overwrite {
        return Err(AppError::Conflict(
            "A resume is already on file. Upload again with overwrite=true to replace it."
                .to_string(),
        ));
    }

    let store = state.profiles_for(&user);
    store
        .put_resume_document(user.user_id, data.clone())
        .await?;
    info!(
        "Stored resume document ({} bytes) for user {}",
        data.len(),
        user.user_id
    );

    let mut resume_text_filled = false;
    if profile.resume_text.trim().is_empty() {
        if let Some(text) = extract_text(data).await {
            store
                .apply_update(user.user_id, &ProfileUpdate::resume_text(text))
                .await?;
            resume_text_filled = true;
        }
    }

    Ok(Json(UploadResponse {
        profile: current_profile(&state, &user).await?,
        resume_text_filled,
    }))
}

/// DELETE /api/v1/profile/resume
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    state
        .profiles_for(&user)
        .delete_resume_document(user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
