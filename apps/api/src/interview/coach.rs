use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::{ChatMessage, InterviewSession};
use crate::llm_client::prompts::INTERVIEWER_SYSTEM;
use crate::llm_client::{Content, LlmClient, LlmError, Part};

/// Shown when a turn fails; the candidate's answer is not recorded.
pub const RETRY_MESSAGE: &str = "I'm having trouble connecting. Please try again.";

// ────────────────────────────────────────────────────────────────────────────
// Interviewer trait
// ────────────────────────────────────────────────────────────────────────────

/// The model behind the interview. `LlmClient` in production.
#[async_trait]
pub trait Interviewer: Send + Sync {
    async fn reply(&self, history: &[Content]) -> Result<String, LlmError>;
}

#[async_trait]
impl Interviewer for LlmClient {
    async fn reply(&self, history: &[Content]) -> Result<String, LlmError> {
        self.chat(history, INTERVIEWER_SYSTEM).await
    }
}

pub fn opening_prompt(role: &str) -> String {
    format!("I am applying for the role of {role}. Please start the interview.")
}

pub fn greeting(role: &str) -> String {
    format!(
        "Hello! I'm ready to conduct a mock interview for the {role} position. \
         Are you ready to begin?"
    )
}

/// Opens a session: primes the model with the role and greets the candidate.
///
/// The greeting is local text, so a failed priming call only loses the
/// model's first reply; the session is still usable.
pub async fn start_session(
    interviewer: &dyn Interviewer,
    owner: Uuid,
    role: &str,
) -> InterviewSession {
    let mut primer = vec![ChatMessage::user(opening_prompt(role))];

    let history: Vec<Content> = primer.iter().map(ChatMessage::to_content).collect();
    match interviewer.reply(&history).await {
        Ok(text) => primer.push(ChatMessage::model(text)),
        Err(e) => warn!("Interview priming failed for {role}: {e}"),
    }

    InterviewSession {
        id: Uuid::new_v4(),
        owner,
        role: role.to_string(),
        created_at: Utc::now(),
        primer,
        transcript: vec![ChatMessage::model(greeting(role))],
    }
}

/// Sends the candidate's answer with the full history. Both messages are
/// appended only when the model replies.
pub async fn answer(
    interviewer: &dyn Interviewer,
    session: &mut InterviewSession,
    text: &str,
) -> Result<ChatMessage, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Message text cannot be empty".to_string()));
    }

    let mut history = session.model_history();
    history.push(Content::user(vec![Part::text(text)]));

    let reply = interviewer.reply(&history).await.map_err(|e| {
        warn!("Interview turn failed for session {}: {e}", session.id);
        AppError::Llm(RETRY_MESSAGE.to_string())
    })?;

    let reply = ChatMessage::model(reply);
    session.transcript.push(ChatMessage::user(text));
    session.transcript.push(reply.clone());
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::interview::ChatRole;

    /// Replays canned replies and records how many turns it was sent.
    struct Scripted {
        replies: Mutex<Vec<Result<String, LlmError>>>,
        seen: Mutex<Vec<usize>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<usize> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Interviewer for Scripted {
        async fn reply(&self, history: &[Content]) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(history.len());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    #[tokio::test]
    async fn test_start_session_greets_and_primes() {
        let model = Scripted::new(vec![Ok("Tell me about yourself.".into())]);
        let session = start_session(&model, Uuid::new_v4(), "Data Engineer").await;

        assert_eq!(session.transcript.len(), 1);
        assert_eq!(
            session.transcript[0].text,
            "Hello! I'm ready to conduct a mock interview for the Data Engineer position. \
             Are you ready to begin?"
        );
        assert_eq!(session.primer.len(), 2);
        assert_eq!(
            session.primer[0].text,
            "I am applying for the role of Data Engineer. Please start the interview."
        );
        // Greeting is never sent to the model.
        assert_eq!(session.model_history().len(), 2);
    }

    #[tokio::test]
    async fn test_start_session_survives_priming_failure() {
        let model = Scripted::new(vec![Err(LlmError::RateLimited { retries: 3 })]);
        let session = start_session(&model, Uuid::new_v4(), "QA").await;
        assert_eq!(session.primer.len(), 1);
        assert_eq!(session.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_answer_sends_full_history_and_appends() {
        let model = Scripted::new(vec![
            Ok("First question".into()),
            Ok("Good answer. Next question".into()),
            Ok("Third question".into()),
        ]);
        let mut session = start_session(&model, Uuid::new_v4(), "SRE").await;

        let reply = answer(&model, &mut session, "  I'm ready  ").await.unwrap();
        assert_eq!(reply.text, "Good answer. Next question");
        answer(&model, &mut session, "Sure").await.unwrap();

        // primer (1) -> primer + answer (3) -> primer + 2 turns + answer (5)
        assert_eq!(model.seen(), vec![1, 3, 5]);
        let roles: Vec<ChatRole> = session.transcript.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::Model,
                ChatRole::User,
                ChatRole::Model,
                ChatRole::User,
                ChatRole::Model
            ]
        );
        assert_eq!(session.transcript[1].text, "I'm ready");
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_transcript_unchanged() {
        let model = Scripted::new(vec![Ok("Hi".into()), Err(LlmError::EmptyContent)]);
        let mut session = start_session(&model, Uuid::new_v4(), "SRE").await;
        let before = session.clone();

        let err = answer(&model, &mut session, "Hello").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(msg) if msg == RETRY_MESSAGE));
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn test_blank_answer_is_rejected_without_model_call() {
        let model = Scripted::new(vec![Ok("Hi".into())]);
        let mut session = start_session(&model, Uuid::new_v4(), "SRE").await;
        let err = answer(&model, &mut session, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(model.seen(), vec![1]);
    }
}
