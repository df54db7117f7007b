use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::llm_client::GroundingChunk;
use crate::profile::current_profile;
use crate::resume::ResumeContent;
use crate::search::{
    find_jobs, listings_from_chunks, search_phrase, JobListing, JobSearchFilters, SearchMode,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub use_resume: bool,
    pub filters: Option<JobSearchFilters>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
    pub listings: Vec<JobListing>,
}

/// POST /api/v1/search
pub async fn handle_search(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = req.query.as_deref().map(str::trim).unwrap_or("");
    if !req.use_resume && query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let profile = current_profile(&state, &user).await?;

    let mode = if req.use_resume {
        let document = state
            .profiles_for(&user)
            .resume_document(user.user_id)
            .await?;
        SearchMode::Resume(ResumeContent::pick(document, [profile.resume_text.as_str()]))
    } else {
        SearchMode::Manual(search_phrase(query, req.location.as_deref()))
    };
    debug!("Job search for user {}: {}", user.user_id, mode_label(&mode));

    let output = find_jobs(&mode, req.filters.as_ref(), &state.llm).await?;
    let listings = listings_from_chunks(&output.grounding_chunks, profile.saved_urls());

    Ok(Json(SearchResponse {
        text: output.text,
        grounding_chunks: output.grounding_chunks,
        listings,
    }))
}

fn mode_label(mode: &SearchMode) -> String {
    match mode {
        SearchMode::Manual(phrase) => phrase.clone(),
        SearchMode::Resume(Some(ResumeContent::Document(_))) => "resume (document)".to_string(),
        SearchMode::Resume(Some(ResumeContent::Text(_))) => "resume (text)".to_string(),
        SearchMode::Resume(None) => "resume (none on file)".to_string(),
    }
}
