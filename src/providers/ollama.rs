use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{parse_base_url, GenerationRequest, TextGenerator};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// HTTP client for making requests
    client: Client,
    /// Full chat URL
    chat_url: String,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of tokens to generate
    num_predict: u32,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    options: GenerationOptions,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl ChatRequest {
    /// Build a non-streaming chat request from a generation request
    pub fn from_generation(request: &GenerationRequest) -> Self {
        Self {
            model: request.options.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: request.system.clone() },
                ChatMessage { role: "user".to_string(), content: request.user.clone() },
            ],
            options: GenerationOptions {
                temperature: request.options.temperature,
                num_predict: request.options.max_tokens,
            },
            stream: false,
        }
    }
}

impl Ollama {
    /// Create a new Ollama client
    ///
    /// Note: Ollama typically uses HTTP/1.1, so we don't force HTTP/2.
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self, ProviderError> {
        let base = parse_base_url(endpoint.as_ref())?;
        let client = Client::builder()
            .timeout(timeout)
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            chat_url: format!("{}/api/chat", base.as_str().trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl TextGenerator for Ollama {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = ChatRequest::from_generation(request);

        let response = self
            .client
            .post(&self.chat_url)
            .timeout(request.options.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            // Log the raw response for debugging
            let preview: String = response_text.chars().take(500).collect();
            error!("Failed to parse Ollama API response: {}. Raw response: {}", e, preview);
            ProviderError::ParseError(e.to_string())
        })?;

        let text = parsed.message.content.trim().to_string();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
