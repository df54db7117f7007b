//! Demo mode: a throwaway identity whose profile lives only in process memory.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::profile::UserProfile;

pub const DEMO_EMAIL: &str = "demo@jobhunter.ai";

const DEMO_RESUME: &str = "\
Experienced Frontend Developer with 5 years of expertise in building scalable web \
applications using React, TypeScript, and Node.js.

Skills:
- Frontend: React, Vue.js, Tailwind CSS, Redux
- Backend: Node.js, Express, PostgreSQL
- Tools: Git, Docker, AWS

Experience:
- Senior Developer at TechCorp (2020-Present): Led migration to React 18, \
improved load times by 40%.
- Frontend Engineer at StartupInc (2018-2020): Built MVP from scratch using MERN stack.
";

pub fn demo_profile() -> UserProfile {
    UserProfile {
        name: "Demo User".to_string(),
        email: DEMO_EMAIL.to_string(),
        target_role: "Senior React Developer".to_string(),
        resume_text: DEMO_RESUME.to_string(),
        has_resume_document: false,
        last_ats_score: Some(75),
        last_interview_date: None,
        saved_jobs: Vec::new(),
    }
}

/// Bounds on the in-memory demo stores. Demo sessions need no login, so both
/// the age and the number of entries are capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoLimits {
    /// Entries older than this are dropped.
    pub ttl: Duration,
    /// At most this many entries are kept; the oldest are evicted first.
    pub max_entries: usize,
}

impl Default for DemoLimits {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 3600),
            max_entries: 1000,
        }
    }
}

impl DemoLimits {
    pub fn is_expired(&self, stamp: Instant) -> bool {
        Instant::now().saturating_duration_since(stamp) >= self.ttl
    }
}

/// Makes room for one more entry: drops expired entries, then evicts the
/// oldest until the map is below `max_entries`.
pub fn make_room<K, V>(
    entries: &mut HashMap<K, V>,
    stamp: impl Fn(&V) -> Instant,
    limits: DemoLimits,
) where
    K: Eq + Hash + Clone,
{
    entries.retain(|_, v| !limits.is_expired(stamp(v)));

    while entries.len() >= limits.max_entries.max(1) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, v)| stamp(v))
            .map(|(k, _)| k.clone());
        match oldest {
            Some(key) => entries.remove(&key),
            None => break,
        };
    }
}
