/*!
 * Provider implementations for text generation services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI chat completions (also used for LM Studio)
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 * - Mock: Scripted generator for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Model settings that accompany a prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.1,
            max_tokens: 2048,
            timeout: Duration::from_secs(120),
        }
    }
}

/// A single prompt: system instructions plus the user message
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System role instructions
    pub system: String,
    /// User role content
    pub user: String,
    /// Model settings
    pub options: ModelOptions,
}

impl GenerationRequest {
    /// Create a new request
    pub fn new(system: impl Into<String>, user: impl Into<String>, options: ModelOptions) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            options,
        }
    }
}

/// Common trait for all text generation backends
///
/// This is the only seam between the pipeline and the external model, so tests
/// substitute scripted implementations here.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Generate text for a prompt
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The generated text or an error
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Build the generator configured as the active provider
pub fn build_generator(config: &TranslationConfig) -> Result<Arc<dyn TextGenerator>, ProviderError> {
    let endpoint = config.get_endpoint();
    let timeout = config.get_timeout();

    let generator: Arc<dyn TextGenerator> = match config.provider {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(config.get_api_key(), endpoint, timeout)?),
        TranslationProvider::LMStudio => {
            // LM Studio often doesn't require an API key; use a default if empty
            let api_key = match config.get_api_key() {
                k if k.is_empty() => "lm-studio".to_string(),
                k => k,
            };
            Arc::new(openai::OpenAI::new(api_key, endpoint, timeout)?)
        }
        TranslationProvider::Anthropic => {
            Arc::new(anthropic::Anthropic::new(config.get_api_key(), endpoint, timeout)?)
        }
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(endpoint, timeout)?),
    };

    Ok(generator)
}

/// Validate and normalise a base endpoint URL
pub(crate) fn parse_base_url(endpoint: &str) -> Result<url::Url, ProviderError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ProviderError::RequestFailed("Endpoint cannot be empty".to_string()));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    url::Url::parse(&with_scheme)
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", endpoint, e)))
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
