use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_NAME: &str = "User";
pub const DEFAULT_EMAIL: &str = "user@example.com";
pub const DEFAULT_TARGET_ROLE: &str = "Job Seeker";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub name: String,
    pub email: String,
    pub target_role: String,
    pub resume_text: String,
    pub resume_document_key: Option<String>,
    pub last_ats_score: Option<i32>,
    pub last_interview_date: Option<DateTime<Utc>>,
}

/// A user-bookmarked job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SavedJob {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub date_saved: DateTime<Utc>,
}

impl SavedJob {
    /// Two saved jobs are the same listing when both url and title agree.
    pub fn same_listing(&self, other: &SavedJob) -> bool {
        self.url == other.url && self.title == other.title
    }
}

/// Profile as returned to clients. The resume binary is never inlined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub target_role: String,
    pub resume_text: String,
    pub has_resume_document: bool,
    pub last_ats_score: Option<i32>,
    pub last_interview_date: Option<DateTime<Utc>>,
    pub saved_jobs: Vec<SavedJob>,
}

impl UserProfile {
    pub fn from_row(row: ProfileRow, saved_jobs: Vec<SavedJob>) -> Self {
        Self {
            name: row.name,
            email: row.email,
            target_role: row.target_role,
            resume_text: row.resume_text,
            has_resume_document: row.resume_document_key.is_some(),
            last_ats_score: row.last_ats_score,
            last_interview_date: row.last_interview_date,
            saved_jobs,
        }
    }

    /// The first whitespace-separated token of the display name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    pub fn saved_urls(&self) -> impl Iterator<Item = &str> {
        self.saved_jobs.iter().filter_map(|j| j.url.as_deref())
    }
}

/// Values used when a profile is created on first load.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDefaults {
    pub name: String,
    pub email: String,
    pub target_role: String,
}

impl ProfileDefaults {
    /// Builds defaults from account metadata, treating blank values as missing.
    pub fn for_account(
        email: Option<&str>,
        full_name: Option<&str>,
        target_role: Option<&str>,
    ) -> Self {
        fn or_default(value: Option<&str>, fallback: &str) -> String {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }

        Self {
            name: or_default(full_name, DEFAULT_NAME),
            email: or_default(email, DEFAULT_EMAIL),
            target_role: or_default(target_role, DEFAULT_TARGET_ROLE),
        }
    }

    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            name: self.name,
            email: self.email,
            target_role: self.target_role,
            resume_text: String::new(),
            has_resume_document: false,
            last_ats_score: Some(0),
            last_interview_date: None,
            saved_jobs: Vec::new(),
        }
    }
}

/// A partial profile write.
///
/// `name`, `email` and `target_role` are only written when present and non-empty.
/// The remaining fields are written whenever present, so an empty resume text clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub target_role: Option<String>,
    #[serde(skip)]
    pub resume_text: Option<String>,
    #[serde(skip)]
    pub last_ats_score: Option<i32>,
    #[serde(skip)]
    pub last_interview_date: Option<DateTime<Utc>>,
}

impl ProfileUpdate {
    pub fn resume_text(text: impl Into<String>) -> Self {
        Self {
            resume_text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn ats_score(score: i32) -> Self {
        Self {
            last_ats_score: Some(clamp_score(score as f64)),
            ..Default::default()
        }
    }

    pub fn interview_started(at: DateTime<Utc>) -> Self {
        Self {
            last_interview_date: Some(at),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn target_role(&self) -> Option<&str> {
        non_empty(&self.target_role)
    }

    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = self.name() {
            profile.name = name.to_string();
        }
        if let Some(email) = self.email() {
            profile.email = email.to_string();
        }
        if let Some(role) = self.target_role() {
            profile.target_role = role.to_string();
        }
        if let Some(text) = &self.resume_text {
            profile.resume_text = text.clone();
        }
        if let Some(score) = self.last_ats_score {
            profile.last_ats_score = Some(score);
        }
        if let Some(date) = self.last_interview_date {
            profile.last_interview_date = Some(date);
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Clamps a model-reported 0..=100 score and rounds it to an integer.
pub fn clamp_score(score: f64) -> i32 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        ProfileDefaults::for_account(Some("ada@example.com"), Some("Ada Lovelace"), None)
            .into_profile()
    }

    #[test]
    fn test_defaults_fill_missing_metadata() {
        let defaults = ProfileDefaults::for_account(None, Some("  "), None);
        assert_eq!(defaults.name, DEFAULT_NAME);
        assert_eq!(defaults.email, DEFAULT_EMAIL);
        assert_eq!(defaults.target_role, DEFAULT_TARGET_ROLE);

        let p = defaults.into_profile();
        assert_eq!(p.last_ats_score, Some(0));
        assert!(p.resume_text.is_empty());
        assert!(p.saved_jobs.is_empty());
    }

    #[test]
    fn test_update_skips_blank_identity_fields() {
        let mut p = profile();
        let update = ProfileUpdate {
            name: Some(String::new()),
            email: None,
            target_role: Some("Staff Engineer".into()),
            ..Default::default()
        };
        update.apply_to(&mut p);
        assert_eq!(p.name, "Ada Lovelace");
        assert_eq!(p.email, "ada@example.com");
        assert_eq!(p.target_role, "Staff Engineer");
    }

    #[test]
    fn test_update_can_clear_resume_text() {
        let mut p = profile();
        p.resume_text = "old".into();
        ProfileUpdate::resume_text("").apply_to(&mut p);
        assert_eq!(p.resume_text, "");
    }

    #[test]
    fn test_ats_score_is_clamped() {
        assert_eq!(ProfileUpdate::ats_score(140).last_ats_score, Some(100));
        assert_eq!(ProfileUpdate::ats_score(-3).last_ats_score, Some(0));
        assert_eq!(clamp_score(72.6), 73);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn test_first_name() {
        assert_eq!(profile().first_name(), "Ada");
        let mut p = profile();
        p.name = String::new();
        assert_eq!(p.first_name(), "");
    }

    #[test]
    fn test_same_listing_requires_url_and_title() {
        let a = SavedJob {
            id: Uuid::new_v4(),
            title: "Rust Engineer".into(),
            company: UNKNOWN_COMPANY.into(),
            url: Some("https://jobs.example.com/1".into()),
            description: None,
            date_saved: Utc::now(),
        };
        let mut b = a.clone();
        b.id = Uuid::new_v4();
        assert!(a.same_listing(&b));
        b.title = "Go Engineer".into();
        assert!(!a.same_listing(&b));
    }
}
