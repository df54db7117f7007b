use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// An account row. Columns not listed here are ignored when decoding.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub target_role: String,
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl UserRow {
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}
