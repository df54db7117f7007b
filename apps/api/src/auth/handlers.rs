use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::accounts::{
    confirm_email, create_account, find_by_email, hash_password, normalize_email,
    validate_password, verify_password, NewAccount,
};
use crate::auth::demo::{demo_profile, DEMO_EMAIL};
use crate::auth::tokens::{issue_token, AuthUser};
use crate::errors::AppError;
use crate::models::profile::UserProfile;
use crate::state::AppState;

const UNCONFIRMED_EMAIL: &str =
    "Please confirm your email address before logging in. Check your inbox.";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub target_role: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub demo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionResponse>,
}

fn session_for(
    state: &AppState,
    user_id: Uuid,
    email: &str,
    demo: bool,
) -> Result<SessionResponse, AppError> {
    let token = issue_token(
        user_id,
        email,
        demo,
        &state.config.jwt_secret,
        Duration::hours(state.config.token_ttl_hours),
    )?;
    Ok(SessionResponse {
        token,
        user_id,
        email: email.to_string(),
        demo,
        profile: None,
    })
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = hash_password(req.password).await?;
    let confirmation_token = state
        .config
        .require_email_confirmation
        .then(|| Uuid::new_v4().simple().to_string());

    let user = create_account(
        &state.db,
        NewAccount {
            email: &email,
            password_hash: &password_hash,
            full_name: req.name.trim(),
            target_role: req.target_role.trim(),
            confirmation_token: confirmation_token.as_deref(),
        },
    )
    .await?;

    info!("Created account {} for {}", user.id, user.email);

    match confirmation_token {
        Some(token) => {
            info!(
                "Confirmation link for {}: {}/api/v1/auth/confirm?token={}",
                user.email, state.config.site_url, token
            );
            Ok(Json(SignupResponse {
                status: "confirmation_required",
                message: format!(
                    "Account created! We sent a confirmation link to {}.",
                    user.email
                ),
                session: None,
            }))
        }
        None => Ok(Json(SignupResponse {
            status: "signed_in",
            message: "Account created!".to_string(),
            session: Some(session_for(&state, user.id, &user.email, false)?),
        })),
    }
}

/// GET /api/v1/auth/confirm?token=<token>
pub async fn handle_confirm(
    State(state): State<AppState>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = confirm_email(&state.db, query.token.trim())
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Confirmation link is invalid or has already been used".to_string())
        })?;

    info!("Confirmed email for account {}", user.id);
    Ok(Json(serde_json::json!({
        "status": "confirmed",
        "email": user.email
    })))
}

/// POST /api/v1/auth/signin
pub async fn handle_signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid login credentials".to_string());

    let email = normalize_email(&req.email).map_err(|_| invalid())?;
    let user = find_by_email(&state.db, &email).await?;

    // Unknown emails still pay for a hash check.
    let hash = user.as_ref().map(|u| u.password_hash.clone());
    let user = match (verify_password(req.password, hash).await?, user) {
        (true, Some(user)) => user,
        _ => return Err(invalid()),
    };

    if state.config.require_email_confirmation && !user.is_confirmed() {
        return Err(AppError::Forbidden(UNCONFIRMED_EMAIL.to_string()));
    }

    Ok(Json(session_for(&state, user.id, &user.email, false)?))
}

/// POST /api/v1/auth/demo
///
/// Starts a demo session. Its profile is seeded in memory and is gone once the
/// session signs out or the process restarts.
pub async fn handle_demo(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let user_id = Uuid::new_v4();
    let profile = demo_profile();
    state.demo_profiles.seed(user_id, profile.clone()).await;

    info!("Started demo session {user_id}");

    let mut session = session_for(&state, user_id, DEMO_EMAIL, true)?;
    session.profile = Some(profile);
    Ok(Json(session))
}

/// POST /api/v1/auth/signout
///
/// Tokens are stateless; only demo sessions have server-side state to discard.
pub async fn handle_signout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    if user.demo {
        state.demo_profiles.remove(user.user_id).await;
        state.demo_interviews.remove_owner(user.user_id).await;
        info!("Ended demo session {}", user.user_id);
    }
    Ok(StatusCode::NO_CONTENT)
}
