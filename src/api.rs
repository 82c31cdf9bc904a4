//! Chat completion API interaction.
//!
//! [`AskAsync`] is the seam the summarizer talks to; [`OpenAiChat`] is the
//! production implementation against an OpenAI-compatible
//! `POST {base}/chat/completions` endpoint.
//!
//! Requests carry only `model` and `messages`; temperature, token limits
//! and the rest stay at the provider's defaults. Failures are returned as
//! errors and are not retried here.

use crate::error::{DigestError, Result};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Trait for async LLM interaction.
///
/// Implementors send a conversation to a model and return the text of the
/// first choice. This abstraction lets the summarizer run against a fake
/// in tests.
pub trait AskAsync {
    /// Send `messages` to the model.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation, oldest first (system prompt first)
    ///
    /// # Returns
    ///
    /// The untrimmed text of the first choice, or an error if the request
    /// failed or produced no choices.
    async fn ask(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    /// `null` for tool-call-only answers.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice; a `null` content counts as empty.
    ///
    /// # Errors
    ///
    /// [`DigestError::EmptyCompletion`] when `choices` is empty.
    pub fn into_first_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(DigestError::EmptyCompletion)
    }
}

/// Chat completions over HTTP with bearer authentication.
pub struct OpenAiChat {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiChat {
    /// Create a client for `{api_base}/chat/completions`.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client (timeouts and user agent are set there)
    /// * `api_base` - Base URL such as `https://api.openai.com/v1`; a trailing
    ///   slash is ignored
    /// * `api_key` - Sent as a bearer token
    /// * `model` - Model identifier put in every request
    ///
    /// # Example
    ///
    /// ```ignore
    /// let chat = OpenAiChat::new(Client::new(), "https://api.openai.com/v1", key, "gpt-4-turbo".into());
    /// let text = chat.ask(&[ChatMessage::system("..."), ChatMessage::user("...")]).await?;
    /// ```
    pub fn new(http: Client, api_base: &str, api_key: String, model: String) -> Self {
        Self {
            http,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key,
            model,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl AskAsync for OpenAiChat {
    /// One `POST`, no retries. A non-2xx status becomes
    /// [`DigestError::Completion`] carrying the response body.
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, messages: &[ChatMessage]) -> Result<String> {
        let t0 = Instant::now();
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                %status,
                elapsed_ms = t0.elapsed().as_millis(),
                body = %truncate_for_log(&body, 300),
                "Completion API call failed"
            );
            return Err(DigestError::Completion { status, body });
        }

        let parsed: ChatCompletionResponse = resp.json().await?;
        let text = parsed.into_first_text()?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis(),
            bytes = text.len(),
            "Completion received"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_has_only_model_and_messages() {
        let messages = vec![ChatMessage::system("be terse"), ChatMessage::user("hello")];
        let request = ChatCompletionRequest {
            model: "gpt-4-turbo",
            messages: &messages,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-4-turbo",
                "messages": [
                    {"role": "system", "content": "be terse"},
                    {"role": "user", "content": "hello"}
                ]
            })
        );
    }

    #[test]
    fn test_first_choice_is_used() {
        let json = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
            ]
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_first_text().unwrap(), "first");
    }

    #[test]
    fn test_no_choices_is_error() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(resp.into_first_text(), Err(DigestError::EmptyCompletion)));
    }

    #[test]
    fn test_null_content_is_empty_text() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_first_text().unwrap(), "");
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let chat = OpenAiChat::new(
            Client::new(),
            "https://api.openai.com/v1/",
            "sk-secret".to_string(),
            "gpt-4-turbo".to_string(),
        );
        assert_eq!(chat.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(chat.model(), "gpt-4-turbo");
        assert!(!format!("{chat:?}").contains("sk-secret"));
    }
}
