use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub candidates_token_count: u32,
    #[serde(rename = "totalTokenCount", default)]
    pub total_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if it has any.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, Box<dyn std::error::Error + Send + Sync>> {
        // The key travels in a header so it never shows up in URLs that
        // reqwest embeds in its error messages.
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!(model = %self.model, contents = request.contents.len(), "Gemini API request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if response.status().is_success() {
            let response_text = response.text().await.map_err(|e| e.without_url())?;
            tracing::debug!("Gemini API response (truncated): {}...", truncate(&response_text, 500));

            match serde_json::from_str::<GenerateContentResponse>(&response_text) {
                Ok(result) => {
                    if let Some(usage) = &result.usage_metadata {
                        tracing::debug!(
                            prompt_tokens = usage.prompt_token_count,
                            completion_tokens = usage.candidates_token_count,
                            total_tokens = usage.total_token_count,
                            "Gemini token usage"
                        );
                    }
                    Ok(result)
                }
                Err(parse_error) => {
                    tracing::error!("Failed to parse Gemini response: {}", parse_error);
                    Err(format!("error decoding response body: {}", parse_error).into())
                }
            }
        } else {
            let status = response.status();
            let error_text = response.text().await.map_err(|e| e.without_url())?;
            Err(format!("Gemini API error ({}): {}", status, error_text).into())
        }
    }

    /// Sends a single user prompt and returns the reply text.
    pub async fn generate_text(
        &self,
        prompt: String,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
                role: Some("user".to_string()),
            }],
        };

        let response = self.generate_content(request).await?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(format!("Gemini blocked the prompt: {}", reason).into());
        }

        response
            .first_text()
            .ok_or_else(|| "Gemini returned no text candidates".into())
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_joins_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "friend."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4, "totalTokenCount": 14}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_text().as_deref(), Some("Hello, friend."));
    }

    #[test]
    fn test_first_text_missing_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(response.first_text().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        let client = GeminiClient::new(
            "SECRET_KEY_123".to_string(),
            "http://127.0.0.1:1/v1beta".to_string(),
            "m".to_string(),
        );

        let err = client.generate_text("hello".to_string()).await.unwrap_err();
        assert!(!err.to_string().contains("SECRET_KEY_123"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
