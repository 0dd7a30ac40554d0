use super::{ChatRequest, ChatResponse, LlmError, REQUEST_TIMEOUT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    text: String,
}

/// The messages API takes the system instruction as a top-level field,
/// not as a conversation message.
fn build_request(request: &ChatRequest) -> ClaudeRequest {
    let system = request
        .messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.clone());

    let messages: Vec<ClaudeMessage> = request
        .messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| ClaudeMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        })
        .collect();

    ClaudeRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        messages,
        system,
    }
}

pub async fn chat(config: &ClaudeConfig, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let body = build_request(request);

    debug!(model = %request.model, turns = body.messages.len(), "claude chat request");
    let resp = client
        .post(format!("{}/v1/messages", config.base_url))
        .header("Content-Type", "application/json")
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        return Err(LlmError::from_status(status, text));
    }

    let data: ClaudeResponse = resp.json().await?;
    let content = data
        .content
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or_else(|| LlmError::Parse("empty content in response".to_string()))?;

    Ok(ChatResponse {
        content,
        model: request.model.clone(),
    })
}
