/*!
 * End-to-end tests of translation runs over the description flow
 */

use std::sync::Arc;

use catalog_translator::providers::mock::MockGenerator;
use catalog_translator::translation::{CancelFlag, RunRequest};

use crate::common::{self, mock_providers};

fn languages(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_run_withThreeRowsTwoLanguages_shouldWritePerLanguageAndCombinedFiles() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let out = dir.path().join("out");
    let mock = mock_providers::translating_generator();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock.clone())),
        RunRequest::new(&input, languages(&["Swedish", "German"]), &out),
    )
    .await;

    assert!(common::errors(&events).is_empty(), "unexpected errors: {:?}", common::errors(&events));
    assert_eq!(mock.call_count(), 6);

    let swedish = common::read_output(&out, "translated_descriptions_Swedish.csv").unwrap();
    assert_eq!(swedish.headers(), ["Product ID", "SKU", "Description", "Description - sv"]);
    assert_eq!(swedish.get(0, "Description - sv"), Some("Translated Swedish"));
    assert_eq!(swedish.get(0, "SKU"), Some("00123"));

    let german = common::read_output(&out, "translated_descriptions_German.csv").unwrap();
    assert_eq!(german.headers().len(), 4);
    assert_eq!(german.get(2, "Description - de"), Some("Translated German"));

    let combined = common::read_output(&out, "translated_descriptions_all.csv").unwrap();
    assert_eq!(
        combined.headers(),
        ["Product ID", "SKU", "Description", "Description - sv", "Description - de"]
    );
    assert_eq!(combined.row_count(), 3);

    let last = events.last().unwrap();
    assert!(last.is_final());
    assert_eq!(last.file.as_deref(), Some("translated_descriptions_all.csv"));
    assert_eq!(last.completed_languages, Some(languages(&["Swedish", "German"])));
    assert_eq!(last.completed_files.as_ref().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_run_withBlankSourceText_shouldSkipModelCall() {
    let dir = common::create_temp_dir().unwrap();
    let csv = "Product ID,SKU,Description\n1,001,A tie\n2,002,\n3,003,   \n";
    let input = common::create_test_file(dir.path(), "products.csv", csv).unwrap();
    let mock = mock_providers::translating_generator();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock.clone())),
        RunRequest::new(&input, languages(&["Swedish"]), dir.path()),
    )
    .await;

    assert!(events.last().unwrap().is_final());
    assert_eq!(mock.call_count(), 1);
    let output = common::read_output(dir.path(), "translated_descriptions_Swedish.csv").unwrap();
    assert_eq!(output.get(1, "Description - sv"), Some(""));
    assert_eq!(output.get(2, "Description - sv"), Some(""));
}

#[tokio::test]
async fn test_run_progress_shouldBeMonotonicAndEndAtHundred() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock_providers::translating_generator())),
        RunRequest::new(&input, languages(&["Swedish", "German"]), dir.path()),
    )
    .await;

    for language in ["Swedish", "German"] {
        let progress = common::progress_for(&events, language);
        assert_eq!(progress, vec![33, 66, 100, 100], "progress for {}", language);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    }

    let first = events.iter().find(|e| e.batch.is_some()).unwrap();
    assert_eq!(first.batch.as_deref(), Some("0-3"));
}

#[tokio::test]
async fn test_run_withSmallBatchSize_shouldReportBatchRanges() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let mut settings = common::fast_settings();
    settings.batch_size = 2;
    let orchestrator = catalog_translator::translation::BatchOrchestrator::new(
        Arc::new(mock_providers::translating_generator()),
        Arc::new(common::language_table()),
        settings,
    );

    let events = common::run_to_end(&orchestrator, RunRequest::new(&input, languages(&["Swedish"]), dir.path())).await;

    let batches: Vec<&str> = events.iter().filter_map(|e| e.batch.as_deref()).collect();
    assert_eq!(batches, vec!["0-2", "0-2", "2-3"]);
}

#[tokio::test]
async fn test_run_withPrefilledCells_shouldMakeNoCallsAndKeepValues() {
    let dir = common::create_temp_dir().unwrap();
    let csv = "\
Product ID,SKU,Description,Description - sv
1,001,A tie,En slips
2,002,A scarf,En halsduk
";
    let input = common::create_test_file(dir.path(), "products.csv", csv).unwrap();
    let mock = mock_providers::translating_generator();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock.clone())),
        RunRequest::new(&input, languages(&["Swedish"]), dir.path()),
    )
    .await;

    assert!(events.last().unwrap().is_final());
    assert_eq!(mock.call_count(), 0);
    let output = common::read_output(dir.path(), "translated_descriptions_all.csv").unwrap();
    assert_eq!(output.column("Description - sv").unwrap(), vec!["En slips", "En halsduk"]);
}

#[tokio::test]
async fn test_run_withTwoTransientFailures_shouldRecoverWithoutErrorEvent() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let mock = MockGenerator::flaky(2);

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock.clone())),
        RunRequest::new(&input, languages(&["Swedish"]), dir.path()),
    )
    .await;

    assert!(common::errors(&events).is_empty());
    assert_eq!(mock.call_count(), 5);
    let output = common::read_output(dir.path(), "translated_descriptions_Swedish.csv").unwrap();
    assert!(output.get(0, "Description - sv").unwrap().starts_with("[GENERATED]"));
}

#[tokio::test]
async fn test_run_withPersistentFailureOnOneRow_shouldReportOneErrorAndContinue() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let mock = mock_providers::failing_on("bow tie");

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock.clone())),
        RunRequest::new(&input, languages(&["Swedish"]), dir.path()),
    )
    .await;

    let errors = common::errors(&events);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].language.as_deref(), Some("Swedish"));
    assert!(errors[0].error.as_deref().unwrap().starts_with("Error at index 1:"));
    assert_eq!(mock.call_count(), 5);

    let output = common::read_output(dir.path(), "translated_descriptions_Swedish.csv").unwrap();
    assert_eq!(output.get(0, "Description - sv"), Some("Translated ok"));
    assert_eq!(output.get(1, "Description - sv"), Some(""));
    assert_eq!(output.get(2, "Description - sv"), Some("Translated ok"));
    assert!(events.last().unwrap().is_final());
}

#[tokio::test]
async fn test_run_withUnresolvedLanguage_shouldSkipItAndCompleteOthers() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock_providers::translating_generator())),
        RunRequest::new(&input, languages(&["Klingon", "Swedish"]), dir.path()),
    )
    .await;

    let errors = common::errors(&events);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].language.as_deref(), Some("Klingon"));
    assert!(errors[0].error.as_deref().unwrap().contains("Error processing language Klingon"));

    let last = events.last().unwrap();
    assert_eq!(last.completed_languages, Some(languages(&["Swedish"])));
    let combined = common::read_output(dir.path(), "translated_descriptions_all.csv").unwrap();
    assert_eq!(combined.headers().len(), 4);
}

#[tokio::test]
async fn test_run_withUnwritableLanguageFile_shouldReportItAndCompleteOthers() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(out.join("translated_descriptions_Swedish.csv")).unwrap();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock_providers::translating_generator())),
        RunRequest::new(&input, languages(&["Swedish", "German"]), &out),
    )
    .await;

    let errors = common::errors(&events);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].language.as_deref(), Some("Swedish"));
    assert!(errors[0].error.as_deref().unwrap().starts_with("Error processing language Swedish: "));
    assert!(!errors[0].is_fatal());

    let last = events.last().unwrap();
    assert!(last.is_final());
    assert_eq!(last.complete, Some(true));
    assert_eq!(last.completed_languages, Some(languages(&["German"])));

    let combined = common::read_output(&out, "translated_descriptions_all.csv").unwrap();
    assert_eq!(combined.headers(), ["Product ID", "SKU", "Description", "Description - de"]);
    assert_eq!(combined.get(0, "Description - de"), Some("Translated German"));
}

#[tokio::test]
async fn test_run_withDuplicateLanguages_shouldTranslateOnce() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let mock = mock_providers::translating_generator();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock.clone())),
        RunRequest::new(&input, languages(&["Swedish", "Swedish"]), dir.path()),
    )
    .await;

    assert_eq!(mock.call_count(), 3);
    let completions = events.iter().filter(|e| e.status.as_deref() == Some("complete")).count();
    assert_eq!(completions, 1);
    assert_eq!(events.last().unwrap().completed_languages, Some(languages(&["Swedish"])));
}

#[tokio::test]
async fn test_run_withMissingInput_shouldEmitSingleFatalEvent() {
    let dir = common::create_temp_dir().unwrap();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock_providers::translating_generator())),
        RunRequest::new(dir.path().join("missing.csv"), languages(&["Swedish"]), dir.path()),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert!(events[0].is_fatal());
    assert!(events[0].error.as_deref().unwrap().starts_with("Fatal error in translation process:"));
}

#[tokio::test]
async fn test_run_withoutSourceColumn_shouldFailFatally() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", "Product ID,SKU,Name\n1,2,Tie\n").unwrap();
    let mock = mock_providers::translating_generator();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock.clone())),
        RunRequest::new(&input, languages(&["Swedish"]), dir.path()),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert!(events[0].error.as_deref().unwrap().contains("Description"));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_run_withHeaderOnlyInput_shouldCompleteWithoutProgress() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", "Product ID,SKU,Description\n").unwrap();

    let events = common::run_to_end(
        &common::orchestrator(Arc::new(mock_providers::translating_generator())),
        RunRequest::new(&input, languages(&["Swedish"]), dir.path()),
    )
    .await;

    assert_eq!(events.iter().filter(|e| e.batch.is_some()).count(), 0);
    assert_eq!(common::progress_for(&events, "Swedish"), vec![100]);
    assert!(events.last().unwrap().is_final());
}

#[tokio::test]
async fn test_run_whenCancelled_shouldStopWithoutCombinedFile() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "products.csv", common::PRODUCTS_CSV).unwrap();
    let mock = mock_providers::translating_generator();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let events = common::orchestrator(Arc::new(mock.clone()))
        .run_with_cancel(RunRequest::new(&input, languages(&["Swedish"]), dir.path()), cancel)
        .collect_all()
        .await;

    assert_eq!(mock.call_count(), 0);
    assert!(events.iter().all(|e| !e.is_final()));
    assert!(events.last().unwrap().is_fatal());
    assert!(!dir.path().join("translated_descriptions_all.csv").exists());
}
