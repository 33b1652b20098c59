use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::translation::pacing::PacingPolicy;
use crate::translation::retry::RetryPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Directory where artifacts are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Path of the language name/code table
    #[serde(default = "default_language_config_path")]
    pub language_config_path: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Hosted providers need an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: default_timeout_secs(),
            rate_limit: None,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Total attempts per generation call, the first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the first retry, doubled on each further retry
    #[serde(default = "default_retry_min_backoff_ms")]
    pub retry_min_backoff_ms: u64,

    /// Upper bound for a single retry wait
    #[serde(default = "default_retry_max_backoff_ms")]
    pub retry_max_backoff_ms: u64,

    /// Add random jitter to retry waits
    #[serde(default)]
    pub retry_jitter: bool,

    /// Only retry errors classified as transient
    #[serde(default = "default_true")]
    pub retry_transient_only: bool,

    /// Delay in milliseconds inserted after every cell
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Rows per progress-reporting batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of curated examples put in a display-name prompt
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,

    /// Run the dictionary verification pass when a dictionary is supplied
    #[serde(default = "default_true")]
    pub enforce_dictionary: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_attempts: default_max_attempts(),
            retry_min_backoff_ms: default_retry_min_backoff_ms(),
            retry_max_backoff_ms: default_retry_max_backoff_ms(),
            retry_jitter: false,
            retry_transient_only: true,
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            batch_size: default_batch_size(),
            max_examples: default_max_examples(),
            enforce_dictionary: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_min_backoff_ms() -> u64 {
    4000
}

fn default_retry_max_backoff_ms() -> u64 {
    10_000
}

fn default_rate_limit_delay_ms() -> u64 {
    300
}

fn default_batch_size() -> usize {
    50
}

fn default_max_examples() -> usize {
    21
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_language_config_path() -> PathBuf {
    PathBuf::from("language_config.json")
}

fn default_endpoint(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        TranslationProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        TranslationProvider::Ollama => "llama3".to_string(),
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

fn api_key_env_var(provider: TranslationProvider) -> Option<&'static str> {
    match provider {
        TranslationProvider::OpenAI => Some("OPENAI_API_KEY"),
        TranslationProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

impl Config {
    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load a configuration file, writing the defaults first if it does not exist
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Per-user config file, e.g. `~/.config/catalog-translator/conf.json`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catalog-translator").join("conf.json"))
    }

    /// Pick the config file to use: `requested` if it exists, else the per-user file if it exists, else `requested`
    pub fn resolve_path(requested: impl AsRef<Path>) -> PathBuf {
        let requested = requested.as_ref();
        if requested.exists() {
            return requested.to_path_buf();
        }
        Self::user_config_path()
            .filter(|p| p.exists())
            .unwrap_or_else(|| requested.to_path_buf())
    }

    /// Save the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let common = &self.translation.common;
        if common.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than zero"));
        }
        if common.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be at least 1"));
        }
        if common.retry_min_backoff_ms > common.retry_max_backoff_ms {
            return Err(anyhow!(
                "retry_min_backoff_ms ({}) exceeds retry_max_backoff_ms ({})",
                common.retry_min_backoff_ms,
                common.retry_max_backoff_ms
            ));
        }

        let provider = self.translation.provider;
        if provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                provider.display_name()
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            translation: TranslationConfig::default(),
            output_dir: default_output_dir(),
            language_config_path: default_language_config_path(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter().find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        match self.get_active_provider_config() {
            Some(provider_config) if !provider_config.model.is_empty() => provider_config.model.clone(),
            _ => default_model(self.provider),
        }
    }

    /// Get the API key for the active provider, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        api_key_env_var(self.provider)
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        match self.get_active_provider_config() {
            Some(provider_config) if !provider_config.endpoint.is_empty() => {
                provider_config.endpoint.clone()
            }
            _ => default_endpoint(self.provider),
        }
    }

    /// Request timeout for the active provider
    pub fn get_timeout(&self) -> Duration {
        let secs = self
            .get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs);
        Duration::from_secs(secs)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        self.get_active_provider_config().and_then(|p| p.rate_limit)
    }

    /// Retry policy derived from the common settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.common.max_attempts,
            min_backoff: Duration::from_millis(self.common.retry_min_backoff_ms),
            max_backoff: Duration::from_millis(self.common.retry_max_backoff_ms),
            jitter: self.common.retry_jitter,
            transient_only: self.common.retry_transient_only,
        }
    }

    /// Pacing policy derived from the common settings and the provider rate limit
    pub fn pacing_policy(&self) -> PacingPolicy {
        PacingPolicy {
            delay_after_cell: Duration::from_millis(self.common.rate_limit_delay_ms),
            max_requests_per_minute: self.get_rate_limit(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
