/*!
 * Tests for application configuration functionality
 */

use std::time::Duration;

use catalog_translator::app_config::{Config, LogLevel, TranslationProvider};
use catalog_translator::translation::OrchestratorSettings;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.translation.common.enforce_dictionary);
    assert_eq!(config.translation.get_endpoint(), "https://api.openai.com/v1");
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.translation.common.batch_size, 50);
    let reloaded = Config::load(&path).unwrap();
    assert_eq!(reloaded.translation.provider, config.translation.provider);
}

#[test]
fn test_load_withInvalidJson_shouldFailWithPath() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    let error = Config::load(&path).unwrap_err();
    assert!(error.to_string().contains("conf.json"));
}

#[test]
fn test_validate_withMissingApiKey_shouldFailForHostedProvider() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    for provider in &mut config.translation.available_providers {
        provider.api_key.clear();
    }

    // The environment may still provide a key
    if std::env::var("ANTHROPIC_API_KEY").is_err() {
        assert!(config.validate().is_err());
    }
}

#[test]
fn test_orchestratorSettings_fromConfig_shouldUseConfiguredTimings() {
    let mut config = Config::default();
    config.translation.common.retry_min_backoff_ms = 100;
    config.translation.common.retry_max_backoff_ms = 200;
    config.translation.common.rate_limit_delay_ms = 0;
    config.translation.common.batch_size = 7;

    let settings = OrchestratorSettings::from(&config.translation);

    assert_eq!(settings.retry.min_backoff, Duration::from_millis(100));
    assert_eq!(settings.retry.max_backoff, Duration::from_millis(200));
    assert_eq!(settings.pacing.delay_after_cell, Duration::ZERO);
    assert_eq!(settings.batch_size, 7);
    assert_eq!(settings.model.model, config.translation.get_model());
}
