/*!
 * Tests for the display-name, dictionary and rewrite flows
 */

use std::sync::Arc;

use catalog_translator::providers::mock::MockGenerator;
use catalog_translator::translation::{AuxiliaryInputs, Flow, PromptPair, RewritePrompts, RunRequest};

use crate::common::{self, mock_providers};

fn languages(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_displayNames_withExamplesForOneLanguage_shouldSkipTheOther() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "names.csv", common::DISPLAY_NAMES_CSV).unwrap();
    let examples = common::create_test_file(dir.path(), "examples.csv", common::EXAMPLES_CSV).unwrap();
    let mock = mock_providers::translating_generator();

    let request = RunRequest::new(&input, languages(&["Swedish", "German"]), dir.path())
        .with_flow(Flow::DisplayNames)
        .with_auxiliary(AuxiliaryInputs { examples_path: Some(examples), ..AuxiliaryInputs::default() });
    let events = common::run_to_end(&common::orchestrator(Arc::new(mock.clone())), request).await;

    let skipped: Vec<_> = events.iter().filter(|e| e.progress.is_some() && e.percent().is_none()).collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].language.as_deref(), Some("German"));
    assert!(common::errors(&events).is_empty());

    // The blank display name needs no call
    assert_eq!(mock.call_count(), 2);

    let last = events.last().unwrap();
    assert_eq!(last.completed_languages, Some(languages(&["Swedish"])));

    let combined = common::read_output(dir.path(), "translated_display_names_all.csv").unwrap();
    assert_eq!(combined.headers(), ["Product ID", "SKU", "Display Name", "Display name - sv"]);
    assert_eq!(combined.get(0, "Display name - sv"), Some("Translated Swedish"));
    assert_eq!(combined.get(1, "Display name - sv"), Some(""));
    assert!(!dir.path().join("translated_display_names_German.csv").exists());
}

#[tokio::test]
async fn test_displayNames_prompt_shouldCarryFormattedExamples() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "names.csv", common::DISPLAY_NAMES_CSV).unwrap();
    let examples = common::create_test_file(dir.path(), "examples.csv", common::EXAMPLES_CSV).unwrap();
    let mock = mock_providers::translating_generator();

    let request = RunRequest::new(&input, languages(&["Swedish"]), dir.path())
        .with_flow(Flow::DisplayNames)
        .with_auxiliary(AuxiliaryInputs {
            examples_path: Some(examples),
            custom_instructions: Some("Keep colour names short".to_string()),
            ..AuxiliaryInputs::default()
        });
    common::run_to_end(&common::orchestrator(Arc::new(mock.clone())), request).await;

    let first = &mock.requests()[0];
    assert!(first.user.contains("Original: Red Tie -> Translated: Röd slips"));
    assert!(first.user.contains("'Red Silk Tie'"));
    assert!(first.user.contains("Keep colour names short"));
    assert_eq!(first.options.temperature, 0.2);
}

#[tokio::test]
async fn test_displayNames_withoutExamplesTable_shouldFailFatally() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "names.csv", common::DISPLAY_NAMES_CSV).unwrap();

    let request = RunRequest::new(&input, languages(&["Swedish"]), dir.path()).with_flow(Flow::DisplayNames);
    let events = common::run_to_end(&common::orchestrator(Arc::new(MockGenerator::working())), request).await;

    assert_eq!(events.len(), 1);
    assert!(events[0].is_fatal());
    assert!(events[0].error.as_deref().unwrap().contains("No examples table supplied"));
}

#[tokio::test]
async fn test_description_withDictionary_shouldReplaceVerifiedSpan() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let dictionary = common::create_test_file(dir.path(), "dictionary.csv", "Original,sv\nbow tie,fluga\n").unwrap();
    let mock = mock_providers::verifying_generator("En rosett för fest", "rosett");

    let request = RunRequest::new(&input, languages(&["Swedish"]), dir.path()).with_auxiliary(AuxiliaryInputs {
        dictionary_path: Some(dictionary),
        ..AuxiliaryInputs::default()
    });
    let events = common::run_to_end(&common::orchestrator(Arc::new(mock.clone())), request).await;

    assert!(events.last().unwrap().is_final());
    // One verification call, only for the row mentioning the term
    assert_eq!(mock.call_count(), 4);

    let output = common::read_output(dir.path(), "translated_descriptions_Swedish.csv").unwrap();
    assert_eq!(output.get(0, "Description - sv"), Some("En rosett för fest"));
    assert_eq!(output.get(1, "Description - sv"), Some("En fluga för fest"));
}

#[tokio::test]
async fn test_description_withInconclusiveVerification_shouldKeepTranslation() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let dictionary = common::create_test_file(dir.path(), "dictionary.csv", "Original,sv\nbow tie,fluga\n").unwrap();
    let mock = mock_providers::verifying_generator("En rosett för fest", "NONE");

    let request = RunRequest::new(&input, languages(&["Swedish"]), dir.path()).with_auxiliary(AuxiliaryInputs {
        dictionary_path: Some(dictionary),
        ..AuxiliaryInputs::default()
    });
    common::run_to_end(&common::orchestrator(Arc::new(mock)), request).await;

    let output = common::read_output(dir.path(), "translated_descriptions_Swedish.csv").unwrap();
    assert_eq!(output.get(1, "Description - sv"), Some("En rosett för fest"));
}

#[tokio::test]
async fn test_description_withMissingDictionaryFile_shouldFailFatally() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();

    let request = RunRequest::new(&input, languages(&["Swedish"]), dir.path()).with_auxiliary(AuxiliaryInputs {
        dictionary_path: Some(dir.path().join("nope.csv")),
        ..AuxiliaryInputs::default()
    });
    let events = common::run_to_end(&common::orchestrator(Arc::new(MockGenerator::working())), request).await;

    assert_eq!(events.len(), 1);
    assert!(events[0].error.as_deref().unwrap().contains("dictionary"));
}

#[tokio::test]
async fn test_rewrite_shouldChainTwoCallsPerCell() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let mock = MockGenerator::working().with_responder(|request| {
        if request.user.starts_with("DRAFT") {
            Ok(format!("final {}", request.user.len()))
        } else {
            Ok("draft".to_string())
        }
    });
    let prompts = RewritePrompts {
        first: PromptPair::new("Writer for {language}", "WRITE {text}"),
        second: PromptPair::new("Editor", "DRAFT {text}"),
    };

    let request = RunRequest::new(&input, languages(&["Swedish"]), dir.path())
        .with_flow(Flow::Rewrite)
        .with_auxiliary(AuxiliaryInputs { prompt_pairs: Some(prompts), ..AuxiliaryInputs::default() });
    let events = common::run_to_end(&common::orchestrator(Arc::new(mock.clone())), request).await;

    assert!(events.last().unwrap().is_final());
    assert_eq!(mock.call_count(), 6);

    let requests = mock.requests();
    assert_eq!(requests[0].system, "Writer for Swedish");
    assert_eq!(requests[0].user, "WRITE A classic silk tie.");
    // The second stage sees the normalized first-stage output
    assert_eq!(requests[1].user, "DRAFT Draft");

    let output = common::read_output(dir.path(), "translated_rewrites_Swedish.csv").unwrap();
    assert_eq!(output.headers(), ["Product ID", "SKU", "Description", "Rewrite - sv"]);
    assert_eq!(output.get(0, "Rewrite - sv"), Some("Final 11"));
}
