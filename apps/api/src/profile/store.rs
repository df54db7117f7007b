//! Profile persistence: pluggable, trait-based store for profiles, saved jobs and
//! the uploaded resume document.
//!
//! `PgProfileStore` backs real accounts (Postgres rows, resume PDF in S3).
//! `MemoryProfileStore` backs demo sessions: state lives only in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::auth::demo::{make_room, DemoLimits};
use crate::errors::AppError;
use crate::models::profile::{ProfileDefaults, ProfileRow, ProfileUpdate, SavedJob, UserProfile};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the profile with its saved jobs, creating it from `defaults` on first load.
    async fn load_or_create(
        &self,
        user_id: Uuid,
        defaults: ProfileDefaults,
    ) -> Result<UserProfile, AppError>;

    /// Partial upsert. See `ProfileUpdate` for which fields are written.
    async fn apply_update(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<(), AppError>;

    async fn put_resume_document(&self, user_id: Uuid, document: Bytes) -> Result<(), AppError>;

    async fn resume_document(&self, user_id: Uuid) -> Result<Option<Bytes>, AppError>;

    async fn delete_resume_document(&self, user_id: Uuid) -> Result<(), AppError>;

    async fn saved_jobs(&self, user_id: Uuid) -> Result<Vec<SavedJob>, AppError>;

    /// Saves a job unless the same url + title is already saved, in which case the
    /// existing record is returned. The returned record carries the store-assigned id.
    async fn add_saved_job(&self, user_id: Uuid, job: SavedJob) -> Result<SavedJob, AppError>;

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgProfileStore
// ────────────────────────────────────────────────────────────────────────────

pub struct PgProfileStore {
    pool: PgPool,
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl PgProfileStore {
    pub fn new(pool: PgPool, s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { pool, s3, bucket }
    }

    async fn profile_row(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(
            sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}

pub fn resume_document_key(user_id: Uuid) -> String {
    format!("resumes/{user_id}/resume.pdf")
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn load_or_create(
        &self,
        user_id: Uuid,
        defaults: ProfileDefaults,
    ) -> Result<UserProfile, AppError> {
        let row = match self.profile_row(user_id).await? {
            Some(row) => row,
            None => {
                info!("No profile found for user {user_id}, creating default profile");
                sqlx::query_as::<_, ProfileRow>(
                    r#"
                    INSERT INTO profiles (id, name, email, target_role, resume_text, last_ats_score)
                    VALUES ($1, $2, $3, $4, '', 0)
                    ON CONFLICT (id) DO UPDATE SET updated_at = profiles.updated_at
                    RETURNING *
                    "#,
                )
                .bind(user_id)
                .bind(&defaults.name)
                .bind(&defaults.email)
                .bind(&defaults.target_role)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let jobs = self.saved_jobs(user_id).await?;
        Ok(UserProfile::from_row(row, jobs))
    }

    async fn apply_update(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO profiles
                (id, name, email, target_role, resume_text,
                 last_ats_score, last_interview_date, updated_at)
            VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''),
                    COALESCE($5, ''), $6, $7, NOW())
            ON CONFLICT (id) DO UPDATE SET
                name = COALESCE($2, profiles.name),
                email = COALESCE($3, profiles.email),
                target_role = COALESCE($4, profiles.target_role),
                resume_text = COALESCE($5, profiles.resume_text),
                last_ats_score = COALESCE($6, profiles.last_ats_score),
                last_interview_date = COALESCE($7, profiles.last_interview_date),
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(update.name())
        .bind(update.email())
        .bind(update.target_role())
        .bind(update.resume_text.as_deref())
        .bind(update.last_ats_score)
        .bind(update.last_interview_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put_resume_document(&self, user_id: Uuid, document: Bytes) -> Result<(), AppError> {
        let key = resume_document_key(user_id);
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(document))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded resume document to s3://{}/{}", self.bucket, key);

        sqlx::query(
            r#"
            INSERT INTO profiles (id, resume_document_key, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET resume_document_key = $2, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(&key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn resume_document(&self, user_id: Uuid) -> Result<Option<Bytes>, AppError> {
        let Some(key) = self
            .profile_row(user_id)
            .await?
            .and_then(|row| row.resume_document_key)
        else {
            return Ok(None);
        };

        let object = self
            .s3
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 download failed: {e}")))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 read failed: {e}")))?;

        Ok(Some(data.into_bytes()))
    }

    async fn delete_resume_document(&self, user_id: Uuid) -> Result<(), AppError> {
        let Some(key) = self
            .profile_row(user_id)
            .await?
            .and_then(|row| row.resume_document_key)
        else {
            return Ok(());
        };

        self.s3
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        sqlx::query(
            "UPDATE profiles SET resume_document_key = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn saved_jobs(&self, user_id: Uuid) -> Result<Vec<SavedJob>, AppError> {
        Ok(sqlx::query_as::<_, SavedJob>(
            r#"
            SELECT id, title, company, url, description, date_saved
            FROM saved_jobs
            WHERE user_id = $1
            ORDER BY date_saved ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_saved_job(&self, user_id: Uuid, job: SavedJob) -> Result<SavedJob, AppError> {
        let existing: Option<SavedJob> = sqlx::query_as(
            r#"
            SELECT id, title, company, url, description, date_saved
            FROM saved_jobs
            WHERE user_id = $1 AND url IS NOT DISTINCT FROM $2 AND title = $3
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(job.url.as_deref())
        .bind(&job.title)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(existing) = existing {
            return Ok(existing);
        }

        let saved: SavedJob = sqlx::query_as(
            r#"
            INSERT INTO saved_jobs (id, user_id, title, company, url, description, date_saved)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, company, url, description, date_saved
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(job.url.as_deref())
        .bind(job.description.as_deref())
        .bind(job.date_saved)
        .fetch_one(&self.pool)
        .await?;

        info!("Saved job {} for user {user_id}", saved.id);
        Ok(saved)
    }

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE id = $1 AND user_id = $2")
            .bind(job_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Saved job {job_id} not found")));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryProfileStore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct MemoryProfile {
    profile: UserProfile,
    document: Option<Bytes>,
    created_at: Instant,
}

impl MemoryProfile {
    fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            document: None,
            created_at: Instant::now(),
        }
    }
}

/// Demo profiles. Bounded by `DemoLimits`: entries older than the token TTL are
/// swept, and the oldest are evicted at capacity, whenever a new entry is added.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<Uuid, MemoryProfile>>,
    limits: DemoLimits,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DemoLimits) -> Self {
        Self {
            profiles: RwLock::default(),
            limits,
        }
    }

    /// Replaces whatever is stored for `user_id` with `profile`.
    pub async fn seed(&self, user_id: Uuid, profile: UserProfile) {
        let mut profiles = self.profiles.write().await;
        if !profiles.contains_key(&user_id) {
            make_room(&mut *profiles, |p: &MemoryProfile| p.created_at, self.limits);
        }
        profiles.insert(user_id, MemoryProfile::new(profile));
    }

    pub async fn remove(&self, user_id: Uuid) {
        self.profiles.write().await.remove(&user_id);
    }

    pub async fn session_count(&self) -> usize {
        self.profiles.read().await.len()
    }

    /// The entry for `user_id`, created from `init` (after making room) if absent.
    fn entry<'a>(
        &self,
        profiles: &'a mut HashMap<Uuid, MemoryProfile>,
        user_id: Uuid,
        init: impl FnOnce() -> UserProfile,
    ) -> &'a mut MemoryProfile {
        if !profiles.contains_key(&user_id) {
            make_room(profiles, |p: &MemoryProfile| p.created_at, self.limits);
        }
        profiles
            .entry(user_id)
            .or_insert_with(|| MemoryProfile::new(init()))
    }
}

fn blank_profile() -> UserProfile {
    UserProfile {
        name: String::new(),
        email: String::new(),
        target_role: String::new(),
        resume_text: String::new(),
        has_resume_document: false,
        last_ats_score: None,
        last_interview_date: None,
        saved_jobs: Vec::new(),
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load_or_create(
        &self,
        user_id: Uuid,
        defaults: ProfileDefaults,
    ) -> Result<UserProfile, AppError> {
        let mut profiles = self.profiles.write().await;
        let entry = self.entry(&mut profiles, user_id, || defaults.into_profile());
        Ok(entry.profile.clone())
    }

    async fn apply_update(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<(), AppError> {
        let mut profiles = self.profiles.write().await;
        let entry = self.entry(&mut profiles, user_id, blank_profile);
        update.apply_to(&mut entry.profile);
        Ok(())
    }

    async fn put_resume_document(&self, user_id: Uuid, document: Bytes) -> Result<(), AppError> {
        let mut profiles = self.profiles.write().await;
        let entry = self.entry(&mut profiles, user_id, blank_profile);
        entry.document = Some(document);
        entry.profile.has_resume_document = true;
        Ok(())
    }

    async fn resume_document(&self, user_id: Uuid) -> Result<Option<Bytes>, AppError> {
        Ok(self
            .profiles
            .read()
            .await
            .get(&user_id)
            .and_then(|p| p.document.clone()))
    }

    async fn delete_resume_document(&self, user_id: Uuid) -> Result<(), AppError> {
        if let Some(entry) = self.profiles.write().await.get_mut(&user_id) {
            entry.document = None;
            entry.profile.has_resume_document = false;
        }
        Ok(())
    }

    async fn saved_jobs(&self, user_id: Uuid) -> Result<Vec<SavedJob>, AppError> {
        Ok(self
            .profiles
            .read()
            .await
            .get(&user_id)
            .map(|p| p.profile.saved_jobs.clone())
            .unwrap_or_default())
    }

    async fn add_saved_job(&self, user_id: Uuid, job: SavedJob) -> Result<SavedJob, AppError> {
        let mut profiles = self.profiles.write().await;
        let entry = self.entry(&mut profiles, user_id, blank_profile);
        let jobs = &mut entry.profile.saved_jobs;
        if let Some(existing) = jobs.iter().find(|j| j.same_listing(&job)) {
            return Ok(existing.clone());
        }
        let saved = SavedJob {
            id: Uuid::new_v4(),
            ..job
        };
        jobs.push(saved.clone());
        Ok(saved)
    }

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
        let mut profiles = self.profiles.write().await;
        let jobs = profiles
            .get_mut(&user_id)
            .map(|p| &mut p.profile.saved_jobs)
            .ok_or_else(|| AppError::NotFound(format!("Saved job {job_id} not found")))?;
        let before = jobs.len();
        jobs.retain(|j| j.id != job_id);
        if jobs.len() == before {
            return Err(AppError::NotFound(format!("Saved job {job_id} not found")));
        }
        Ok(())
    }
}

/// Builds a saved-job record stamped with the current time; the store assigns the final id.
pub fn new_saved_job(
    title: String,
    company: String,
    url: Option<String>,
    description: Option<String>,
) -> SavedJob {
    SavedJob {
        id: Uuid::new_v4(),
        title,
        company,
        url,
        description,
        date_saved: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ProfileDefaults {
        ProfileDefaults::for_account(Some("ada@example.com"), Some("Ada"), Some("Engineer"))
    }

    fn job(title: &str, url: &str) -> SavedJob {
        new_saved_job(title.into(), "Acme".into(), Some(url.into()), None)
    }

    #[tokio::test]
    async fn test_load_or_create_is_idempotent() {
        let store = MemoryProfileStore::new();
        let user = Uuid::new_v4();
        let first = store.load_or_create(user, defaults()).await.unwrap();
        store
            .apply_update(user, &ProfileUpdate::resume_text("my resume"))
            .await
            .unwrap();
        let other_defaults = ProfileDefaults::for_account(None, None, None);
        let second = store.load_or_create(user, other_defaults).await.unwrap();
        assert_eq!(first.name, "Ada");
        assert_eq!(second.name, "Ada");
        assert_eq!(second.resume_text, "my resume");
    }

    #[tokio::test]
    async fn test_add_saved_job_dedups_and_assigns_id() {
        let store = MemoryProfileStore::new();
        let user = Uuid::new_v4();
        let candidate = job("Rust Engineer", "https://jobs.example.com/1");
        let client_id = candidate.id;

        let saved = store.add_saved_job(user, candidate.clone()).await.unwrap();
        assert_ne!(saved.id, client_id);

        let again = store.add_saved_job(user, candidate).await.unwrap();
        assert_eq!(again.id, saved.id);
        assert_eq!(store.saved_jobs(user).await.unwrap().len(), 1);

        store
            .add_saved_job(user, job("Rust Engineer", "https://jobs.example.com/2"))
            .await
            .unwrap();
        assert_eq!(store.saved_jobs(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_saved_job() {
        let store = MemoryProfileStore::new();
        let user = Uuid::new_v4();
        let saved = store
            .add_saved_job(user, job("Rust Engineer", "https://jobs.example.com/1"))
            .await
            .unwrap();

        store.delete_saved_job(user, saved.id).await.unwrap();
        assert!(store.saved_jobs(user).await.unwrap().is_empty());

        let err = store.delete_saved_job(user, saved.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_saved_jobs_are_scoped_to_owner() {
        let store = MemoryProfileStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let saved = store
            .add_saved_job(alice, job("Rust Engineer", "https://jobs.example.com/1"))
            .await
            .unwrap();
        assert!(store.saved_jobs(bob).await.unwrap().is_empty());
        assert!(store.delete_saved_job(bob, saved.id).await.is_err());
    }

    #[tokio::test]
    async fn test_resume_document_lifecycle() {
        let store = MemoryProfileStore::new();
        let user = Uuid::new_v4();
        store.load_or_create(user, defaults()).await.unwrap();
        assert!(store.resume_document(user).await.unwrap().is_none());

        store
            .put_resume_document(user, Bytes::from_static(b"%PDF-1.7"))
            .await
            .unwrap();
        let profile = store.load_or_create(user, defaults()).await.unwrap();
        assert!(profile.has_resume_document);
        assert_eq!(
            store.resume_document(user).await.unwrap().as_deref(),
            Some(&b"%PDF-1.7"[..])
        );

        store.delete_resume_document(user).await.unwrap();
        let profile = store.load_or_create(user, defaults()).await.unwrap();
        assert!(!profile.has_resume_document);
    }

    #[tokio::test]
    async fn test_remove_discards_state() {
        let store = MemoryProfileStore::new();
        let user = Uuid::new_v4();
        store.seed(user, defaults().into_profile()).await;
        store
            .apply_update(user, &ProfileUpdate::ats_score(80))
            .await
            .unwrap();
        store.remove(user).await;
        let fresh = store.load_or_create(user, defaults()).await.unwrap();
        assert_eq!(fresh.last_ats_score, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_profiles_are_bounded() {
        let store = MemoryProfileStore::with_limits(DemoLimits {
            ttl: std::time::Duration::from_secs(3600),
            max_entries: 3,
        });
        let users: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for user in &users {
            store.seed(*user, defaults().into_profile()).await;
            tokio::time::advance(std::time::Duration::from_secs(1)).await;
        }
        assert_eq!(store.session_count().await, 3);

        // Updating a kept entry evicts nothing.
        store
            .apply_update(users[4], &ProfileUpdate::ats_score(90))
            .await
            .unwrap();
        assert_eq!(store.session_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_demo_profiles_are_swept() {
        let store = MemoryProfileStore::with_limits(DemoLimits {
            ttl: std::time::Duration::from_secs(60),
            max_entries: 100,
        });
        for _ in 0..10 {
            store.seed(Uuid::new_v4(), defaults().into_profile()).await;
        }
        tokio::time::advance(std::time::Duration::from_secs(61)).await;

        store
            .load_or_create(Uuid::new_v4(), defaults())
            .await
            .unwrap();
        assert_eq!(store.session_count().await, 1);
    }

    #[test]
    fn test_resume_document_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            resume_document_key(id),
            "resumes/00000000-0000-0000-0000-000000000000/resume.pdf"
        );
    }
}
