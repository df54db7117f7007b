use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::AuthUser;
use crate::config::Config;
use crate::interview::store::{InterviewStore, MemoryInterviewStore, RedisInterviewStore};
use crate::llm_client::LlmClient;
use crate::profile::store::{MemoryProfileStore, PgProfileStore, ProfileStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub config: Config,
    /// Profiles and saved jobs of real accounts (Postgres + S3).
    pub profiles: Arc<dyn ProfileStore>,
    /// Demo sessions: never persisted.
    pub demo_profiles: Arc<MemoryProfileStore>,
    /// Interview transcripts of real accounts (Redis).
    pub interviews: Arc<dyn InterviewStore>,
    pub demo_interviews: Arc<MemoryInterviewStore>,
}

impl AppState {
    /// Wires the production backends and the bounded demo stores.
    pub fn new(
        config: Config,
        db: PgPool,
        llm: LlmClient,
        s3: aws_sdk_s3::Client,
        redis: redis::Client,
    ) -> Self {
        Self {
            profiles: Arc::new(PgProfileStore::new(db.clone(), s3, config.s3_bucket.clone())),
            demo_profiles: Arc::new(MemoryProfileStore::with_limits(config.demo_profile_limits())),
            interviews: Arc::new(RedisInterviewStore::new(
                redis,
                config.interview_session_ttl_secs,
            )),
            demo_interviews: Arc::new(MemoryInterviewStore::with_limits(
                config.demo_interview_limits(),
            )),
            db,
            llm,
            config,
        }
    }

    /// Picks the profile backend for the caller.
    pub fn profiles_for(&self, user: &AuthUser) -> &dyn ProfileStore {
        if user.demo {
            self.demo_profiles.as_ref()
        } else {
            self.profiles.as_ref()
        }
    }

    pub fn interviews_for(&self, user: &AuthUser) -> &dyn InterviewStore {
        if user.demo {
            self.demo_interviews.as_ref()
        } else {
            self.interviews.as_ref()
        }
    }
}
