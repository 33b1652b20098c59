use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{parse_base_url, GenerationRequest, TextGenerator};

/// OpenAI-compatible chat completions client
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Full chat completions URL
    completions_url: String,
}

/// Chat completions request body
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
}

impl OpenAIRequest {
    /// Build the request body from a generation request
    pub fn from_generation(request: &GenerationRequest) -> Self {
        Self {
            model: request.options.model.clone(),
            messages: vec![
                OpenAIMessage { role: "system".to_string(), content: Some(request.system.clone()) },
                OpenAIMessage { role: "user".to_string(), content: Some(request.user.clone()) },
            ],
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
        }
    }
}

impl OpenAI {
    /// Create a new client for an OpenAI-compatible endpoint
    pub fn new(api_key: impl Into<String>, endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self, ProviderError> {
        let base = parse_base_url(endpoint.as_ref())?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            completions_url: format!("{}/chat/completions", base.as_str().trim_end_matches('/')),
        })
    }

    /// Extract the first choice's text
    pub fn extract_text(response: &OpenAIResponse) -> Option<String> {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

#[async_trait]
impl TextGenerator for OpenAI {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = OpenAIRequest::from_generation(request);

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
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
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let parsed = response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Self::extract_text(&parsed).ok_or(ProviderError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
