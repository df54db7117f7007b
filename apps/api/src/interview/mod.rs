// Interview Coach: multi-turn mock interviews.
// Transcripts live in Redis for real accounts and in memory for demo sessions.

pub mod coach;
pub mod handlers;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm_client::{Content, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    fn to_content(&self) -> Content {
        match self.role {
            ChatRole::User => Content::user(vec![Part::text(self.text.clone())]),
            ChatRole::Model => Content::model(self.text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    pub owner: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
    /// Hidden opening exchange that primes the model with the role.
    pub primer: Vec<ChatMessage>,
    /// What the candidate sees. The first message is the local greeting and is
    /// never sent to the model.
    pub transcript: Vec<ChatMessage>,
}

impl InterviewSession {
    /// The conversation as the model sees it.
    pub fn model_history(&self) -> Vec<Content> {
        self.primer
            .iter()
            .chain(self.transcript.iter().skip(1))
            .map(ChatMessage::to_content)
            .collect()
    }
}

/// Session as returned to clients.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl From<InterviewSession> for SessionView {
    fn from(session: InterviewSession) -> Self {
        Self {
            id: session.id,
            role: session.role,
            created_at: session.created_at,
            messages: session.transcript,
        }
    }
}
