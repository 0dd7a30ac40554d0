use super::{ChatMessage, ChatRequest, ChatResponse, LlmError, REQUEST_TIMEOUT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

pub async fn chat(config: &OpenAiConfig, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let body = OpenAiRequest {
        model: &request.model,
        messages: &request.messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    };

    debug!(model = %request.model, turns = request.messages.len(), "openai chat request");
    let mut req = client
        .post(format!("{}/chat/completions", config.base_url))
        .header("Content-Type", "application/json")
        .json(&body);

    if !config.api_key.is_empty() {
        req = req.header("Authorization", format!("Bearer {}", config.api_key));
    }

    let resp = req.send().await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        return Err(LlmError::from_status(status, text));
    }

    let data: OpenAiResponse = resp.json().await?;
    let content = data
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| LlmError::Parse("no choices in response".to_string()))?;

    Ok(ChatResponse {
        content,
        model: request.model.clone(),
    })
}
