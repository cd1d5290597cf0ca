use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{IlmquestError, Result};
use crate::types::Citation;

/// Marker separating the answer from the trailing follow-up payload.
pub const DEFAULT_SENTINEL: &str = "===SUGGESTED_FOLLOWUPS===";

/// Answer used when the generation service returns no text at all.
pub const DEFAULT_FALLBACK_ANSWER: &str = "No response generated";

/// Persona and format instruction sent as the first message of every request.
///
/// `{sentinel}` is replaced with the configured sentinel before use.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert Islamic Q&A Assistant named Ilmquest.
Answer questions based on the Quran, Hadith, and Islamic scholarship.
Be concise, accurate, and respectful.

At the end of your answer, write the line {sentinel} and then provide 3 short
suggested follow-up questions that a user might ask next, formatted as a JSON
array of strings.";

/// Top-level configuration for the Ilmquest service.
///
/// Loaded from `~/.ilmquest/config.toml` by default. Every section falls back
/// to its defaults when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IlmquestConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

impl IlmquestConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: IlmquestConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    ///
    /// The inline API key is never written out.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| IlmquestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            allowed_origins: Vec::new(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Settings for the outbound text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Generation length cap.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Inline API key. Prefer `api_key_env`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/v1".to_string(),
            model: "deepseek-ai/DeepSeek-V3-0324:fastest".to_string(),
            max_tokens: 700,
            timeout_secs: 60,
            api_key: None,
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Resolve the API key: inline value first, then the configured env var.
    ///
    /// Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Conversation window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of prior turns forwarded to the model.
    pub window_size: usize,
    /// System prompt template. `{sentinel}` is substituted at start-up.
    pub system_prompt: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Reply shaping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Literal marker between the answer and the follow-up payload.
    pub sentinel: String,
    /// Answer used when the model produced no text.
    pub fallback_answer: String,
    /// Longest accepted question, in characters.
    pub max_question_chars: usize,
    /// Citations attached to every reply.
    pub citations: Vec<Citation>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
            max_question_chars: 4000,
            citations: vec![Citation {
                source: "Islamic Scholarship".to_string(),
                content: "Based on Quran and Hadith".to_string(),
            }],
        }
    }
}
