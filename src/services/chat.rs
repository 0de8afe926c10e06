// src/services/chat.rs
use crate::error::AppError;
use crate::gemini_client::GeminiClient;
use crate::models::chat::ChatMessage;
use crate::services::conversation_log::ConversationLog;
use async_trait::async_trait;

/// A generative-text backend that turns a prompt into a reply.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, prompt: String) -> Result<String, AppError>;
}

#[async_trait]
impl ChatProvider for GeminiClient {
    async fn complete(&self, prompt: String) -> Result<String, AppError> {
        self.generate_text(prompt)
            .await
            .map_err(|e| AppError::ProviderFailure(e.to_string()))
    }
}

const SYSTEM_INSTRUCTIONS: &str = "You are a supportive and empathetic mental health companion. \
Talk naturally with the user about how they are feeling, ask gentle follow-up questions, \
and notice possible signs of anxiety, depression or stress. Never diagnose. \
Encourage professional help when concerns sound serious, and remind the user that you \
are not a substitute for professional medical advice. Offer practical coping strategies \
and self-care tips when they fit.";

pub fn build_prompt(message: &str, history: &[ChatMessage]) -> Result<String, AppError> {
    let history_json = serde_json::to_string(history)
        .map_err(|e| AppError::UnexpectedServerError(format!("failed to serialize history: {}", e)))?;

    Ok(format!(
        "{}\n\nPrevious conversation context: {}\n\nUser's message: {}\n\n\
         Provide a thoughtful, empathetic response while following the above guidelines.",
        SYSTEM_INSTRUCTIONS, history_json, message
    ))
}

/// Forwards one user message to the provider and records the turn.
///
/// Writing the transcript is best-effort: a failed append is logged and the
/// reply is still returned.
pub async fn converse(
    provider: &dyn ChatProvider,
    log: &ConversationLog,
    message: &str,
    history: &[ChatMessage],
) -> Result<String, AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    let prompt = build_prompt(message, history)?;
    let reply = provider.complete(prompt).await?;

    if let Err(e) = log.append(message, &reply).await {
        tracing::warn!(path = %log.path().display(), "Error writing to conversation log: {}", e);
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ChatRole, Mood};
    use std::sync::Mutex;

    struct EchoProvider {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatProvider for EchoProvider {
        async fn complete(&self, prompt: String) -> Result<String, AppError> {
            self.prompts.lock().unwrap().push(prompt);
            Ok("I hear you.".to_string())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ChatProvider for FailingProvider {
        async fn complete(&self, _prompt: String) -> Result<String, AppError> {
            Err(AppError::ProviderFailure("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_prompt_embeds_history_and_message() {
        let history = vec![ChatMessage {
            role: ChatRole::User,
            content: "I can't sleep".to_string(),
            mood: Some(Mood::Sad),
        }];
        let prompt = build_prompt("still awake", &history).unwrap();
        assert!(prompt.contains(r#""content":"I can't sleep""#));
        assert!(prompt.contains("User's message: still awake"));
    }

    #[tokio::test]
    async fn test_converse_logs_turn() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path().join("log.txt"));
        let provider = EchoProvider { prompts: Mutex::new(Vec::new()) };

        let reply = converse(&provider, &log, "  hello  ", &[]).await.unwrap();
        assert_eq!(reply, "I hear you.");
        assert_eq!(provider.prompts.lock().unwrap().len(), 1);

        let written = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert!(written.contains("User: hello\nBot: I hear you.\n"));
    }

    #[tokio::test]
    async fn test_log_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist, so the append fails.
        let log = ConversationLog::new(dir.path().join("missing").join("log.txt"));
        let provider = EchoProvider { prompts: Mutex::new(Vec::new()) };

        let reply = converse(&provider, &log, "hello", &[]).await.unwrap();
        assert_eq!(reply, "I hear you.");
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_logged() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path().join("log.txt"));

        let err = converse(&FailingProvider, &log, "hello", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::ProviderFailure(_)));
        assert!(!log.path().exists());
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path().join("log.txt"));
        let provider = EchoProvider { prompts: Mutex::new(Vec::new()) };

        let err = converse(&provider, &log, "   ", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(provider.prompts.lock().unwrap().is_empty());
    }
}
