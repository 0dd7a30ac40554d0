use crate::config::{ChatConfig, ConfigError, Settings};
use crate::conversation::{InvalidInput, Turn};
use crate::extractor::{self, ExtractionError};
use crate::llm::{ChatMessage, ChatRequest, LlmError, Provider};
use crate::store::{SessionNotFound, SessionStore};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    SessionNotFound(#[from] SessionNotFound),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{provider} API key not configured; set {env_var} or add it to .env")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },
    #[error("session was reset while the request was in flight; response discarded")]
    StaleResponse,
}

/// Upload outcome shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStatus {
    pub page_count: usize,
    pub truncated: bool,
    /// False when this session already holds an injected document.
    pub injected: bool,
}

/// Resolve an LLM provider from a model id like "openai/gpt-4o" or
/// "claude/claude-sonnet-4-20250514".
fn resolve_provider(model: &str, settings: &Settings) -> Result<(Provider, String), ChatError> {
    if let Some(model_id) = model.strip_prefix("claude/") {
        let api_key = settings
            .anthropic_api_key
            .clone()
            .ok_or(ChatError::MissingApiKey {
                provider: "Anthropic",
                env_var: "ANTHROPIC_API_KEY",
            })?;
        Ok((
            Provider::claude(api_key, settings.anthropic_base_url.clone()),
            model_id.to_string(),
        ))
    } else {
        let model_id = model.strip_prefix("openai/").unwrap_or(model);
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or(ChatError::MissingApiKey {
                provider: "OpenAI",
                env_var: "OPENAI_API_KEY",
            })?;
        Ok((
            Provider::openai(api_key, settings.openai_base_url.clone()),
            model_id.to_string(),
        ))
    }
}

/// Orchestrates upload → inject → question/answer cycles over isolated
/// per-session conversations.
pub struct ChatService {
    store: SessionStore,
    settings: Settings,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(settings: Settings, config: ChatConfig) -> Result<Self, ChatError> {
        config.validate()?;
        Ok(ChatService {
            store: SessionStore::new(),
            settings,
            config,
        })
    }

    /// Service with defaults and credentials from the environment.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::new(Settings::from_env(), ChatConfig::default())
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn create_session(&self) -> Uuid {
        self.store.create(&self.config.system_prompt)
    }

    pub fn remove_session(&self, id: Uuid) -> bool {
        self.store.remove(id)
    }

    /// Extract text from uploaded PDF bytes and inject it into the
    /// session's conversation. Injection happens at most once per
    /// conversation lifetime; re-uploads report `injected: false`.
    pub fn upload_document(&self, id: Uuid, bytes: &[u8]) -> Result<DocumentStatus, ChatError> {
        let doc = extractor::extract_text(bytes, self.config.max_pages)?;
        if doc.text.trim().is_empty() {
            return Err(InvalidInput::EmptyDocument.into());
        }
        let injected = self
            .store
            .with(id, |s| {
                s.conversation
                    .inject_document(&doc.text, self.config.doc_char_limit)
            })?;
        Ok(DocumentStatus {
            page_count: doc.page_count,
            truncated: doc.truncated,
            injected,
        })
    }

    /// One question/answer cycle: validate, append the question, send the
    /// bounded window to the provider, append the answer. A failed call
    /// leaves the question in the history; a reset that happened while the
    /// call was in flight makes the response stale and it is discarded.
    pub async fn send_message(&self, id: Uuid, question: &str) -> Result<String, ChatError> {
        // Append and snapshot the window under the lock; the provider
        // call happens without it.
        let (window, version) = self
            .store
            .with(id, |s| -> Result<_, InvalidInput> {
                s.conversation.append_question(question)?;
                Ok((
                    s.conversation.window(self.config.window_size),
                    s.version(),
                ))
            })??;

        let (provider, model_id) = resolve_provider(&self.config.model, &self.settings)?;
        let request = ChatRequest {
            messages: window.iter().map(ChatMessage::from).collect(),
            model: model_id,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        debug!(session = %id, turns = request.messages.len(), "sending chat request");

        let response = provider.chat(&request).await.map_err(|err| {
            warn!(session = %id, error = %err, "provider call failed");
            err
        })?;

        self.store.with(id, |s| {
            if s.version() != version {
                warn!(session = %id, "discarding stale response after reset");
                return Err(ChatError::StaleResponse);
            }
            s.conversation
                .append_answer(Turn::assistant(response.content.clone()));
            Ok(response.content)
        })?
    }

    /// Drop all Q&A turns and start over with the same document.
    pub fn reset_session(&self, id: Uuid) -> Result<(), ChatError> {
        self.store.with(id, |s| {
            s.reset(&self.config.system_prompt, self.config.doc_char_limit)
        })?;
        Ok(())
    }

    /// Full turn history, for rendering.
    pub fn history(&self, id: Uuid) -> Result<Vec<Turn>, ChatError> {
        Ok(self.store.with(id, |s| s.conversation.turns().to_vec())?)
    }

    /// Content of the most recent assistant turn, if any.
    pub fn last_answer(&self, id: Uuid) -> Result<Option<String>, ChatError> {
        Ok(self
            .store
            .with(id, |s| s.conversation.last_assistant().map(str::to_owned))?)
    }
}
