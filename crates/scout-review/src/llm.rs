use std::time::Duration;

use scout_core::{LlmConfig, ScoutError};
use serde::Serialize;
use tracing::debug;

/// Returned when the completion response carries no usable text.
pub const EMPTY_REVIEW_FALLBACK: &str = "The model returned no review text.";

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use scout_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Review this diff");
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// A `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use scout_review::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes `/v1/chat/completions`.
///
/// # Examples
///
/// ```
/// use scout_core::LlmConfig;
/// use scout_review::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gpt-4o-mini");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, ScoutError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ScoutError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a chat completion request and return the text response.
    ///
    /// A single attempt is made. A response without text yields
    /// [`EMPTY_REVIEW_FALLBACK`].
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Llm`] on transport errors, on any non-success
    /// status (with the status and the response body verbatim), or when the
    /// body is not JSON.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ScoutError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": messages,
        });

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!(%url, model = %self.config.model, "sending completion request");
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScoutError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScoutError::Llm(format!("failed to parse response: {e}")))?;

        Ok(extract_content(&response_body))
    }
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_content(body: &serde_json::Value) -> String {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(EMPTY_REVIEW_FALLBACK)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test".into()),
            base_url: server.uri(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn chat_message_serializes() {
        let msg = ChatMessage::system("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn extract_content_falls_back() {
        let empty = serde_json::json!({ "choices": [] });
        assert_eq!(extract_content(&empty), EMPTY_REVIEW_FALLBACK);

        let blank = serde_json::json!({ "choices": [{ "message": { "content": "  " } }] });
        assert_eq!(extract_content(&blank), EMPTY_REVIEW_FALLBACK);

        let null = serde_json::json!({ "choices": [{ "message": { "content": null } }] });
        assert_eq!(extract_content(&null), EMPTY_REVIEW_FALLBACK);
    }

    #[tokio::test]
    async fn chat_sends_model_and_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "diff" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Looks good." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(&config_for(&server)).unwrap();
        let text = client
            .chat(vec![ChatMessage::system("sys"), ChatMessage::user("diff")])
            .await
            .unwrap();
        assert_eq!(text, "Looks good.");
    }

    #[tokio::test]
    async fn server_error_is_fatal_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(&config_for(&server)).unwrap();
        let err = client.chat(vec![ChatMessage::user("x")]).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("500"), "{text}");
        assert!(text.contains("upstream exploded"), "{text}");
    }

    #[tokio::test]
    async fn non_json_success_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = LlmClient::new(&config_for(&server)).unwrap();
        let err = client.chat(vec![ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, ScoutError::Llm(_)));
    }
}
