// src/models/chat.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Neutral,
}

/// One turn of the in-browser conversation. The web client sends the role
/// under `type`, so both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(alias = "type")]
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "chatHistory", default)]
    pub chat_history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub mood: Mood,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_accepts_client_shape() {
        let raw = r#"{
            "message": "hi",
            "chatHistory": [
                {"type": "user", "content": "hello", "mood": "neutral"},
                {"role": "bot", "content": "Hi there"}
            ]
        }"#;
        let req: ChatRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.chat_history.len(), 2);
        assert_eq!(req.chat_history[0].role, ChatRole::User);
        assert_eq!(req.chat_history[0].mood, Some(Mood::Neutral));
        assert_eq!(req.chat_history[1].role, ChatRole::Bot);
        assert_eq!(req.chat_history[1].mood, None);
    }

    #[test]
    fn test_missing_history_defaults_to_empty() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(req.chat_history.is_empty());
    }
}
