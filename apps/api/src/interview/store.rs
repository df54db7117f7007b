use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::auth::demo::{make_room, DemoLimits};
use crate::errors::AppError;
use crate::interview::InterviewSession;

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn save(&self, session: &InterviewSession) -> Result<(), AppError>;

    /// `None` for unknown or expired sessions.
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError>;
}

fn session_key(id: Uuid) -> String {
    format!("interview:{id}")
}

/// JSON transcripts in Redis. Every save refreshes the TTL.
pub struct RedisInterviewStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisInterviewStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

#[async_trait]
impl InterviewStore for RedisInterviewStore {
    async fn save(&self, session: &InterviewSession) -> Result<(), AppError> {
        let payload = serde_json::to_string(session).context("Failed to encode interview session")?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(session_key(session.id), payload, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(session_key(id)).await?;
        let session = payload
            .map(|p| serde_json::from_str(&p))
            .transpose()
            .context("Failed to decode interview session")?;
        Ok(session)
    }
}

#[derive(Debug)]
struct MemoryInterview {
    session: InterviewSession,
    touched: Instant,
}

/// In-process transcripts for demo sessions. Like the Redis store, a save
/// refreshes the TTL; expired sessions are invisible and swept on insert.
#[derive(Debug, Default)]
pub struct MemoryInterviewStore {
    sessions: RwLock<HashMap<Uuid, MemoryInterview>>,
    limits: DemoLimits,
}

impl MemoryInterviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DemoLimits) -> Self {
        Self {
            sessions: RwLock::default(),
            limits,
        }
    }

    /// Drops every session owned by `owner`.
    pub async fn remove_owner(&self, owner: Uuid) {
        self.sessions
            .write()
            .await
            .retain(|_, s| s.session.owner != owner);
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl InterviewStore for MemoryInterviewStore {
    async fn save(&self, session: &InterviewSession) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            make_room(&mut *sessions, |s: &MemoryInterview| s.touched, self.limits);
        }
        sessions.insert(
            session.id,
            MemoryInterview {
                session: session.clone(),
                touched: Instant::now(),
            },
        );
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&id)
            .filter(|s| !self.limits.is_expired(s.touched))
            .map(|s| s.session.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(owner: Uuid) -> InterviewSession {
        InterviewSession {
            id: Uuid::new_v4(),
            owner,
            role: "Backend Engineer".to_string(),
            created_at: Utc::now(),
            primer: Vec::new(),
            transcript: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryInterviewStore::new();
        let s = session(Uuid::new_v4());
        store.save(&s).await.unwrap();
        assert_eq!(store.load(s.id).await.unwrap(), Some(s));
        assert!(store.load(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_owner_only_drops_that_owner() {
        let store = MemoryInterviewStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let (a, b) = (session(alice), session(bob));
        store.save(&a).await.unwrap();
        store.save(&b).await.unwrap();

        store.remove_owner(alice).await;
        assert!(store.load(a.id).await.unwrap().is_none());
        assert!(store.load(b.id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_sessions_expire_and_are_capped() {
        let store = MemoryInterviewStore::with_limits(DemoLimits {
            ttl: std::time::Duration::from_secs(60),
            max_entries: 2,
        });
        let owner = Uuid::new_v4();
        let first = session(owner);
        store.save(&first).await.unwrap();

        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(store.load(first.id).await.unwrap().is_none());

        for _ in 0..3 {
            store.save(&session(owner)).await.unwrap();
        }
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_refreshes_ttl() {
        let store = MemoryInterviewStore::with_limits(DemoLimits {
            ttl: std::time::Duration::from_secs(60),
            max_entries: 10,
        });
        let s = session(Uuid::new_v4());
        store.save(&s).await.unwrap();
        tokio::time::advance(std::time::Duration::from_secs(45)).await;
        store.save(&s).await.unwrap();
        tokio::time::advance(std::time::Duration::from_secs(45)).await;
        assert!(store.load(s.id).await.unwrap().is_some());
    }

    #[test]
    fn test_session_key_layout() {
        assert_eq!(
            session_key(Uuid::nil()),
            "interview:00000000-0000-0000-0000-000000000000"
        );
    }
}
