pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::profile::upload::MAX_UPLOAD_BYTES;
use crate::state::AppState;
use crate::{auth, dashboard, interview, matcher, profile, resume, saved_jobs, search};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/signup", post(auth::handlers::handle_signup))
        .route("/api/v1/auth/confirm", get(auth::handlers::handle_confirm))
        .route("/api/v1/auth/signin", post(auth::handlers::handle_signin))
        .route("/api/v1/auth/demo", post(auth::handlers::handle_demo))
        .route("/api/v1/auth/signout", post(auth::handlers::handle_signout))
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard::handlers::handle_dashboard))
        // Profile
        .route(
            "/api/v1/profile",
            get(profile::handlers::handle_get_profile)
                .patch(profile::handlers::handle_update_profile),
        )
        .route(
            "/api/v1/profile/resume-text",
            put(profile::handlers::handle_put_resume_text),
        )
        .route(
            "/api/v1/profile/resume",
            post(profile::handlers::handle_upload_resume)
                .delete(profile::handlers::handle_delete_resume)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Saved jobs
        .route(
            "/api/v1/jobs",
            get(saved_jobs::handlers::handle_list_jobs)
                .post(saved_jobs::handlers::handle_save_job),
        )
        .route("/api/v1/jobs/:id", delete(saved_jobs::handlers::handle_delete_job))
        // Resume optimizer
        .route("/api/v1/resume/analyze", post(resume::handlers::handle_analyze))
        .route(
            "/api/v1/resume/improved-pdf",
            post(resume::handlers::handle_improved_pdf),
        )
        // Job matcher
        .route("/api/v1/match", post(matcher::handlers::handle_match))
        // Job search
        .route("/api/v1/search", post(search::handlers::handle_search))
        // Interview coach
        .route(
            "/api/v1/interview/sessions",
            post(interview::handlers::handle_start_interview),
        )
        .route(
            "/api/v1/interview/sessions/:id",
            get(interview::handlers::handle_get_interview),
        )
        .route(
            "/api/v1/interview/sessions/:id/messages",
            post(interview::handlers::handle_answer),
        )
        .with_state(state)
}
