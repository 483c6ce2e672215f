//! Configuration for the chat service.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::chat::errors::{ChatError, ChatResult};

/// Environment variable for the server port.
const PORT_ENV: &str = "OFFLINE_CHAT_PORT";
/// Environment variable for the LM Studio base URL.
const LM_STUDIO_URL_ENV: &str = "OFFLINE_CHAT_LM_STUDIO_URL";
/// Environment variable for the model name.
const MODEL_ENV: &str = "OFFLINE_CHAT_MODEL";
/// Environment variable for the session storage directory.
const SESSIONS_DIR_ENV: &str = "OFFLINE_CHAT_SESSIONS_DIR";
/// Environment variable for the intent classifier mode (`heuristic` or `llm`).
const INTENT_MODE_ENV: &str = "OFFLINE_CHAT_INTENT_MODE";

/// Top-level configuration for the chat service.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Session storage settings.
    pub storage: StorageConfig,
    /// Inference server settings.
    pub llm: LlmConfig,
    /// Intent classification settings.
    pub intent: IntentConfig,
    /// Follow-up question settings.
    pub follow_up: FollowUpConfig,
}

impl ChatConfig {
    /// Build a configuration from defaults with environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = std::env::var(PORT_ENV).ok().and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }
        if let Ok(base_url) = std::env::var(LM_STUDIO_URL_ENV) {
            config.llm.base_url = base_url;
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            config.llm.model = model;
        }
        if let Ok(dir) = std::env::var(SESSIONS_DIR_ENV) {
            config.storage.sessions_dir = PathBuf::from(dir);
        }
        if let Ok(mode) = std::env::var(INTENT_MODE_ENV) {
            if mode.eq_ignore_ascii_case("llm") {
                config.intent.mode = IntentMode::Llm;
            }
        }

        config
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        if self.server.port == 0 {
            return Err(ChatError::InvalidConfig(
                "server.port must be > 0".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }

        if self.llm.request_timeout_secs == 0 {
            return Err(ChatError::InvalidConfig(
                "llm.request_timeout_secs must be > 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ChatError::InvalidConfig(
                "llm.temperature must be within [0, 2]".to_string(),
            ));
        }

        if self.follow_up.max_questions == 0 {
            return Err(ChatError::InvalidConfig(
                "follow_up.max_questions must be > 0".to_string(),
            ));
        }

        Url::parse(&self.llm.base_url)?;

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the server binds to.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// Session storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per session.
    pub sessions_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sessions_dir: PathBuf::from("data/sessions"),
        }
    }
}

/// Inference server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LM Studio base URL.
    pub base_url: String,
    /// Model name as loaded in LM Studio.
    pub model: String,
    /// Default sampling temperature.
    pub temperature: f64,
    /// Default token budget; `-1` means no limit (LM Studio convention).
    pub max_tokens: i64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1234".to_string(),
            model: "mistral-7b-instruct-v0.3".to_string(),
            temperature: 0.7,
            max_tokens: -1,
            connect_timeout_secs: 5,
            request_timeout_secs: 120,
        }
    }
}

/// Intent classifier mode selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentMode {
    /// Regex-based classification only.
    #[default]
    Heuristic,
    /// LLM-assisted classification, heuristic as fallback.
    Llm,
}

/// Intent classification settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IntentConfig {
    /// Which classifier mode to use.
    pub mode: IntentMode,
}

/// Follow-up question settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FollowUpConfig {
    /// Whether follow-up questions are appended to responses.
    pub enabled: bool,
    /// Minimum assistant reply length to consider a follow-up.
    pub min_response_chars: usize,
    /// Maximum candidate questions to keep per generation.
    pub max_questions: usize,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_response_chars: 50,
            max_questions: 3,
        }
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
    fn test_invalid_base_url_rejected() {
        let mut config = ChatConfig::default();
        config.llm.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = ChatConfig::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ChatError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut config = ChatConfig::default();
        config.llm.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        let mut config = ChatConfig::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_intent_mode_is_heuristic() {
        assert_eq!(IntentConfig::default().mode, IntentMode::Heuristic);
    }
}
