//! Text-generation client: trait + OpenAI-compatible chat completions implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ilmquest_core::config::GenerationConfig;
use ilmquest_core::Turn;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChatError;

/// A service that turns a message sequence into one block of generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for `messages`. Returns the raw text of the first choice.
    async fn generate(&self, messages: &[Turn]) -> Result<String, ChatError>;

    /// Model identifier, for logs and health reporting.
    fn model(&self) -> &str;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// =============================================================================
// ChatCompletionsClient
// =============================================================================

/// Client for any `/chat/completions` endpoint (Hugging Face router, OpenAI,
/// Ollama, ...). One request per call, no retries.
pub struct ChatCompletionsClient {
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
    fallback_text: String,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Build a client from configuration.
    ///
    /// `fallback_text` is returned when the service answers without any text.
    pub fn new(
        config: &GenerationConfig,
        fallback_text: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "No API key configured for the generation service; sending unauthenticated requests"
            );
        }

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
            fallback_text: fallback_text.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, messages: &[Turn]) -> Result<String, ChatError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let started = Instant::now();
        let res = request.send().await?;
        let status = res.status();
        let text = res.text().await?;
        debug!(
            model = %self.model,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation service responded"
        );

        if !status.is_success() {
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty());

        Ok(content.unwrap_or_else(|| self.fallback_text.clone()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
