pub mod claude;
pub mod openai;

use crate::conversation::Turn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outbound calls time out instead of hanging on a stalled provider.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Wire-format message sent to a provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        ChatMessage {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
}

/// Unified LLM provider enum — dispatches to OpenAI-compatible or Claude
/// backends.
#[derive(Debug, Clone)]
pub enum Provider {
    OpenAi(openai::OpenAiConfig),
    Claude(claude::ClaudeConfig),
}

impl Provider {
    pub fn openai(api_key: String, base_url: Option<String>) -> Self {
        Provider::OpenAi(openai::OpenAiConfig {
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        })
    }

    pub fn claude(api_key: String, base_url: Option<String>) -> Self {
        Provider::Claude(claude::ClaudeConfig {
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.anthropic.com".to_string()),
        })
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        match self {
            Provider::OpenAi(config) => openai::chat(config, request).await,
            Provider::Claude(config) => claude::chat(config, request).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("authentication rejected by provider: {0}")]
    Auth(String),
    #[error("rate limited by provider: {0}")]
    RateLimited(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl LlmError {
    /// Map a non-2xx provider response onto the failure taxonomy.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => LlmError::Auth(message),
            429 => LlmError::RateLimited(message),
            _ => LlmError::Api { status, message },
        }
    }

    /// Transient failures the user may simply retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited(_) => true,
            LlmError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            LlmError::from_status(401, "bad key".into()),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            LlmError::from_status(403, "forbidden".into()),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            LlmError::from_status(429, "slow down".into()),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            LlmError::from_status(500, "boom".into()),
            LlmError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        assert!(LlmError::from_status(429, String::new()).is_retryable());
        assert!(!LlmError::from_status(401, String::new()).is_retryable());
        assert!(!LlmError::Parse("bad json".into()).is_retryable());
    }

    #[test]
    fn test_turn_to_wire_message() {
        let turn = Turn {
            role: Role::Assistant,
            content: "hi".into(),
        };
        let msg = ChatMessage::from(&turn);
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.content, "hi");
    }
}
