use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an assistant that answers questions based on the content of a PDF document provided by the user.";

const MAX_TOKENS_LIMIT: u32 = 4096;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
}

/// Models the chat service accepts. Ids carry a provider prefix that
/// `chat::resolve_provider` dispatches on.
pub fn available_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            id: "openai/gpt-4o".into(),
            name: "GPT-4o".into(),
            provider: "OpenAI".into(),
        },
        ModelInfo {
            id: "openai/gpt-4o-mini".into(),
            name: "GPT-4o Mini".into(),
            provider: "OpenAI".into(),
        },
        ModelInfo {
            id: "claude/claude-sonnet-4-20250514".into(),
            name: "Claude Sonnet 4".into(),
            provider: "Anthropic".into(),
        },
    ]
}

/// Provider credentials and endpoints, sourced from the environment.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
}

impl Settings {
    /// Read settings from a `.env` file (if present) and the process
    /// environment. Empty values count as unset.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Settings {
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_base_url: env_opt("ANTHROPIC_BASE_URL"),
        }
    }

    /// Settings rendered for display, with API keys masked.
    pub fn masked(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(key) = &self.openai_api_key {
            map.insert("openai_api_key".to_string(), mask_key(key));
        }
        if let Some(url) = &self.openai_base_url {
            map.insert("openai_base_url".to_string(), url.clone());
        }
        if let Some(key) = &self.anthropic_api_key {
            map.insert("anthropic_api_key".to_string(), mask_key(key));
        }
        if let Some(url) = &self.anthropic_base_url {
            map.insert("anthropic_base_url".to_string(), url.clone());
        }
        map
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn mask_key(value: &str) -> String {
    if value.is_ascii() && value.len() > 8 {
        format!("{}...{}", &value[..4], &value[value.len() - 4..])
    } else {
        "***".to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error("max_tokens must be within 1..={MAX_TOKENS_LIMIT}, got {0}")]
    MaxTokensOutOfRange(u32),
    #[error("temperature must be within 0.0..=2.0, got {0}")]
    TemperatureOutOfRange(f32),
    #[error("window size must be at least 1")]
    ZeroWindow,
    #[error("document character limit must be at least 1")]
    ZeroDocumentLimit,
}

/// Tunables for one chat service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// How many turns of history each model request carries.
    pub window_size: usize,
    /// Character cap applied to document text before injection.
    pub doc_char_limit: usize,
    /// Page cap passed to the extractor.
    pub max_pages: usize,
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            model: "openai/gpt-4o".to_string(),
            max_tokens: 1000,
            temperature: 0.0,
            window_size: 6,
            doc_char_limit: 15_000,
            max_pages: 20,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !available_models().iter().any(|m| m.id == self.model) {
            return Err(ConfigError::UnknownModel(self.model.clone()));
        }
        if self.max_tokens == 0 || self.max_tokens > MAX_TOKENS_LIMIT {
            return Err(ConfigError::MaxTokensOutOfRange(self.max_tokens));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.temperature));
        }
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.doc_char_limit == 0 {
            return Err(ConfigError::ZeroDocumentLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ChatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_model_rejected() {
        let config = ChatConfig {
            model: "openai/gpt-2".into(),
            ..ChatConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_max_tokens_bounds() {
        for bad in [0, MAX_TOKENS_LIMIT + 1] {
            let config = ChatConfig {
                max_tokens: bad,
                ..ChatConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::MaxTokensOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_temperature_bounds() {
        let config = ChatConfig {
            temperature: 2.5,
            ..ChatConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TemperatureOutOfRange(_))
        ));
    }

    #[test]
    fn test_mask_key_keeps_edges() {
        assert_eq!(mask_key("sk-abcdefghijklmnop"), "sk-a...mnop");
        assert_eq!(mask_key("short"), "***");
    }

    #[test]
    fn test_catalog_has_enumerated_models() {
        let ids: Vec<String> = available_models().into_iter().map(|m| m.id).collect();
        assert!(ids.contains(&"openai/gpt-4o".to_string()));
        assert!(ids.contains(&"openai/gpt-4o-mini".to_string()));
    }
}
