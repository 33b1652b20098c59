/*!
 * Tests for the provider implementations
 */

use catalog_translator::app_config::{TranslationConfig, TranslationProvider};
use catalog_translator::providers::anthropic::{Anthropic, AnthropicRequest, AnthropicResponse};
use catalog_translator::providers::ollama::ChatRequest;
use catalog_translator::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};
use catalog_translator::providers::{build_generator, GenerationRequest, ModelOptions, TextGenerator};

fn request() -> GenerationRequest {
    let options = ModelOptions {
        model: "test-model".to_string(),
        temperature: 0.2,
        ..ModelOptions::default()
    };
    GenerationRequest::new("You are an expert product translator.", "Translate: tie", options)
}

#[test]
fn test_openaiRequest_shouldCarrySystemAndUserMessages() {
    let body = serde_json::to_value(OpenAIRequest::from_generation(&request())).unwrap();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Translate: tie");
    assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
}

#[test]
fn test_openaiExtractText_withBlankChoice_shouldReturnNone() {
    let response: OpenAIResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"   "}}]}"#).unwrap();
    assert_eq!(OpenAI::extract_text(&response), None);

    let response: OpenAIResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":" Slips \n"}}]}"#).unwrap();
    assert_eq!(OpenAI::extract_text(&response).as_deref(), Some("Slips"));
}

#[test]
fn test_anthropicRequest_shouldPutSystemPromptAtTopLevel() {
    let body = serde_json::to_value(AnthropicRequest::from_generation(&request())).unwrap();
    assert_eq!(body["system"], "You are an expert product translator.");
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");
}

#[test]
fn test_anthropicExtractText_shouldJoinTextBlocksOnly() {
    let response: AnthropicResponse = serde_json::from_str(
        r#"{"content":[{"type":"text","text":"En "},{"type":"tool_use"},{"type":"text","text":"slips"}]}"#,
    )
    .unwrap();
    assert_eq!(Anthropic::extract_text_from_response(&response), "En slips");
}

#[test]
fn test_ollamaRequest_shouldDisableStreaming() {
    let body = serde_json::to_value(ChatRequest::from_generation(&request())).unwrap();
    assert_eq!(body["stream"], false);
    assert_eq!(body["model"], "test-model");
}

#[test]
fn test_buildGenerator_forEachProvider_shouldNameIt() {
    let cases = [
        (TranslationProvider::OpenAI, "openai"),
        (TranslationProvider::LMStudio, "openai"),
        (TranslationProvider::Anthropic, "anthropic"),
        (TranslationProvider::Ollama, "ollama"),
    ];
    for (provider, expected) in cases {
        let config = TranslationConfig { provider, ..TranslationConfig::default() };
        let generator = build_generator(&config).unwrap();
        assert_eq!(generator.name(), expected);
    }
}

/// Live OpenAI call
#[tokio::test]
#[ignore]
async fn test_openai_provider_withValidApiKey_shouldComplete() {
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        return;
    }

    let client = OpenAI::new(api_key, "https://api.openai.com/v1", std::time::Duration::from_secs(30)).unwrap();
    let mut live = request();
    live.options.model = "gpt-4o-mini".to_string();

    let text = client.generate(&live).await.unwrap();
    assert!(!text.is_empty());
    println!("OpenAI response: {}", text);
}
