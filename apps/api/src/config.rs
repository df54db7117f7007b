use std::time::Duration;

use anyhow::{Context, Result};

use crate::auth::demo::DemoLimits;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub gemini_api_key: String,
    pub jwt_secret: String,
    /// Base URL used when building email confirmation links.
    pub site_url: String,
    pub require_email_confirmation: bool,
    pub interview_session_ttl_secs: u64,
    pub token_ttl_hours: i64,
    /// Cap on concurrent demo profiles and demo interview sessions.
    pub demo_max_sessions: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            require_email_confirmation: optional_env("REQUIRE_EMAIL_CONFIRMATION", "true")
                .parse::<bool>()
                .context("REQUIRE_EMAIL_CONFIRMATION must be true or false")?,
            interview_session_ttl_secs: optional_env("INTERVIEW_SESSION_TTL_SECS", "3600")
                .parse::<u64>()
                .context("INTERVIEW_SESSION_TTL_SECS must be a number of seconds")?,
            token_ttl_hours: optional_env("TOKEN_TTL_HOURS", "24")
                .parse::<i64>()
                .context("TOKEN_TTL_HOURS must be a number of hours")?,
            demo_max_sessions: optional_env("DEMO_MAX_SESSIONS", "1000")
                .parse::<usize>()
                .context("DEMO_MAX_SESSIONS must be a positive number")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

impl Config {
    /// Demo profiles live as long as the token that created them.
    pub fn demo_profile_limits(&self) -> DemoLimits {
        let hours = u64::try_from(self.token_ttl_hours).unwrap_or(0);
        DemoLimits {
            ttl: Duration::from_secs(hours.saturating_mul(3600)),
            max_entries: self.demo_max_sessions,
        }
    }

    pub fn demo_interview_limits(&self) -> DemoLimits {
        DemoLimits {
            ttl: Duration::from_secs(self.interview_session_ttl_secs),
            max_entries: self.demo_max_sessions,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
