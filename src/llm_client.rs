//! Chat completion client for the OpenAI and Anthropic APIs.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Provider, credentials and model for an [`LlmClient`].
///
/// The API key never shows up in `Debug` output.
#[derive(Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            provider,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Body of a Messages API call.
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [AnthropicMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl AnthropicResponse {
    /// Joins the text blocks of the reply.
    fn into_text(self) -> Result<String, LlmError> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicBlock::Text { text } => Some(text),
                AnthropicBlock::Other => None,
            })
            .collect();
        if text.is_empty() {
            return Err(LlmError::new("No text content in Anthropic response".to_string()));
        }
        Ok(text)
    }
}

/// Describes a failed Anthropic call from its status and body.
fn anthropic_failure(status: reqwest::StatusCode, body: &str) -> LlmError {
    match serde_json::from_str::<AnthropicErrorBody>(body) {
        Ok(AnthropicErrorBody { error }) => LlmError::new(format!(
            "Anthropic API error {status} ({}): {}",
            error.kind, error.message
        )),
        Err(_) => LlmError::new(format!("Anthropic API error {status}: {body}")),
    }
}

/// Sends one system prompt and one user message to a chat model.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Returns the model's text reply.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failures, non-success statuses, and
    /// replies without text.
    #[instrument(
        skip_all,
        fields(provider = ?self.config.provider, model = %self.config.model)
    )]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let content = match self.config.provider {
            LlmProvider::OpenAI => self.generate_openai(system_prompt, user_message).await,
            LlmProvider::Anthropic => self.generate_anthropic(system_prompt, user_message).await,
        }
        .inspect_err(|e| warn!(error = %e, "Completion failed"))?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    fn anthropic_request<'a>(&'a self, system: &'a str, user: &'a str) -> AnthropicRequest<'a> {
        AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: [AnthropicMessage {
                role: "user",
                content: user,
            }],
        }
    }

    async fn generate_anthropic(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let response = self
            .http
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.anthropic_request(system, user))
            .send()
            .await
            .map_err(|e| LlmError::new(format!("Anthropic API request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::new(format!("Failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(anthropic_failure(status, &body));
        }

        serde_json::from_str::<AnthropicResponse>(&body)
            .map_err(|e| LlmError::new(format!("Failed to parse Anthropic response: {e}")))?
            .into_text()
    }

    fn openai_request(
        &self,
        system: &str,
        user: &str,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let build_failed = |e: async_openai::error::OpenAIError| {
            LlmError::new(format!("Failed to build OpenAI request: {e}"))
        };
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(build_failed)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(build_failed)?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .build()
            .map_err(build_failed)
    }

    async fn generate_openai(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new().with_api_key(self.config.api_key.clone()),
        );
        let response = client
            .chat()
            .create(self.openai_request(system, user)?)
            .await
            .map_err(|e| LlmError::new(format!("OpenAI API error: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::new("No content in OpenAI response".to_string()))
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(provider: LlmProvider) -> LlmClient {
        LlmClient::new(LlmConfig::new(
            provider,
            "sk-secret".to_string(),
            "test-model".to_string(),
            64,
        ))
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = LlmConfig::new(
            LlmProvider::Anthropic,
            "sk-secret".to_string(),
            "claude-3-5-haiku-latest".to_string(),
            256,
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("claude-3-5-haiku-latest"));
    }

    #[test]
    fn test_anthropic_request_body() {
        let client = client(LlmProvider::Anthropic);
        let body = serde_json::to_value(client.anthropic_request("be brief", "your move")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "test-model",
                "max_tokens": 64,
                "system": "be brief",
                "messages": [{ "role": "user", "content": "your move" }],
            })
        );
    }

    #[test]
    fn test_anthropic_reply_joins_text_blocks() {
        let reply: AnthropicResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": "{\"move\": 4," },
                { "type": "text", "text": " \"explanation\": \"center\"}" },
            ],
            "stop_reason": "end_turn",
        }))
        .unwrap();
        assert_eq!(
            reply.into_text().unwrap(),
            "{\"move\": 4, \"explanation\": \"center\"}"
        );
    }

    #[test]
    fn test_anthropic_reply_without_text_is_error() {
        let reply: AnthropicResponse = serde_json::from_value(json!({ "content": [] })).unwrap();
        let err = reply.into_text().unwrap_err();
        assert!(err.message.contains("No text content"));
    }

    #[test]
    fn test_anthropic_failure_reads_error_body() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = anthropic_failure(reqwest::StatusCode::SERVICE_UNAVAILABLE, body);
        assert!(err.message.contains("overloaded_error"));
        assert!(err.message.contains("Overloaded"));

        let err = anthropic_failure(reqwest::StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(err.message.contains("502"));
        assert!(err.message.contains("bad gateway"));
    }

    #[test]
    fn test_openai_request_carries_model_and_messages() {
        let client = client(LlmProvider::OpenAI);
        let request = client.openai_request("be brief", "your move").unwrap();
        assert_eq!(request.model, "test-model");
        assert_eq!(request.messages.len(), 2);
        assert!(matches!(request.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(request.messages[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_error_records_call_site() {
        let err = LlmError::new("boom".to_string());
        assert_eq!(err.file, file!());
        assert!(err.to_string().starts_with("LLM error: boom at "));
    }
}
