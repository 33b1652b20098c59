/*!
 * Tests for error types and conversions
 */

use catalog_translator::errors::{ProviderError, RunError, TableError, TranslationError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_serverAndThrottling_shouldBeTransient() {
    for status_code in [500, 502, 503, 408, 429] {
        let error = ProviderError::ApiError { status_code, message: String::new() };
        assert!(error.is_transient(), "status {} should be transient", status_code);
    }
    assert!(ProviderError::ConnectionError("reset".into()).is_transient());
    assert!(ProviderError::EmptyResponse.is_transient());
}

#[test]
fn test_providerError_clientErrors_shouldNotBeTransient() {
    let error = ProviderError::ApiError { status_code: 400, message: "bad".to_string() };
    assert!(!error.is_transient());
    assert!(!ProviderError::AuthenticationError("nope".into()).is_transient());
    assert!(!ProviderError::ParseError("garbled".into()).is_transient());
}

#[test]
fn test_providerError_fromStatus_shouldPickSpecificVariants() {
    assert!(matches!(ProviderError::from_status(401, "x"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "x"), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(503, "x"),
        ProviderError::ApiError { status_code: 503, .. }
    ));
}

#[test]
fn test_translationError_generation_shouldReportAttempts() {
    let error = TranslationError::Generation {
        attempts: 3,
        source: ProviderError::Timeout("30s".to_string()),
    };
    let display = error.to_string();
    assert!(display.contains("3 attempt(s)"));
    assert!(display.contains("30s"));
}

#[test]
fn test_runError_input_shouldNameFileAndColumn() {
    let error = RunError::Input {
        path: "products.csv".to_string(),
        source: TableError::MissingColumn("SKU".to_string()),
    };
    let display = error.to_string();
    assert!(display.contains("products.csv"));
    assert!(display.contains("Missing required column 'SKU'"));
}

#[test]
fn test_runError_missingAuxiliary_shouldNameTable() {
    assert_eq!(RunError::MissingAuxiliary("examples").to_string(), "No examples table supplied");
}
