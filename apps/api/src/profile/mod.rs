// Profile synchronization: one profile per account, created on first load.
// Every screen reads its inputs (resume, target role, saved jobs) from here.

pub mod handlers;
pub mod store;
pub mod upload;

use crate::auth::accounts::find_by_id;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{ProfileDefaults, UserProfile};
use crate::state::AppState;

/// Loads the caller's profile, creating the default one on first access.
pub async fn current_profile(state: &AppState, user: &AuthUser) -> Result<UserProfile, AppError> {
    let defaults = if user.demo {
        ProfileDefaults::for_account(Some(&user.email), None, None)
    } else {
        let account = find_by_id(&state.db, user.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
        ProfileDefaults::for_account(
            Some(&account.email),
            Some(&account.full_name),
            Some(&account.target_role),
        )
    };

    state
        .profiles_for(user)
        .load_or_create(user.user_id, defaults)
        .await
}
