/*!
 * Error types for the catalog translator.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider answered but produced no text
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Connection drops, timeouts, rate limiting, empty answers and server-side
    /// failures are transient. Authentication failures, unparsable responses and
    /// client-side (4xx) request errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_)
            | Self::RateLimitExceeded(_)
            | Self::Timeout(_)
            | Self::EmptyResponse
            | Self::RequestFailed(_) => true,
            Self::ApiError { status_code, .. } => {
                *status_code >= 500 || *status_code == 408 || *status_code == 429
            }
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }

    /// Map an HTTP status and body into the matching provider error
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur during translation of a single cell
#[derive(Error, Debug)]
pub enum TranslationError {
    /// All generation attempts failed
    #[error("Generation failed after {attempts} attempt(s): {source}")]
    Generation {
        /// Number of attempts that were made
        attempts: u32,
        /// The error of the last attempt
        #[source]
        source: ProviderError,
    },

    /// The strategy could not build a prompt for this cell
    #[error("Prompt error: {0}")]
    Prompt(String),
}

/// Errors from reading or writing CSV tables
#[derive(Error, Debug)]
pub enum TableError {
    /// Underlying file system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column the caller relies on is absent
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// The input had no header row
    #[error("Table has no header row")]
    NoHeader,
}

/// Errors from the language name/code table
#[derive(Error, Debug)]
pub enum LanguageConfigError {
    /// Underlying file system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The table file is not valid JSON
    #[error("Invalid language config: {0}")]
    Json(#[from] serde_json::Error),

    /// No code is configured for the language name
    #[error("No language code configured for '{0}'")]
    Unresolved(String),
}

/// Run-level failures that abort a whole translation run
#[derive(Error, Debug)]
pub enum RunError {
    /// The input table could not be loaded
    #[error("Failed to load input table {path}: {source}")]
    Input {
        /// Path of the input table
        path: String,
        /// What went wrong
        #[source]
        source: TableError,
    },

    /// An auxiliary table (examples, dictionary) could not be loaded
    #[error("Failed to load {what} table {path}: {source}")]
    Auxiliary {
        /// Which table failed
        what: &'static str,
        /// Path of the table
        path: String,
        /// What went wrong
        #[source]
        source: TableError,
    },

    /// The flow needs an auxiliary table that was not supplied
    #[error("No {0} table supplied")]
    MissingAuxiliary(&'static str),

    /// The output directory or combined artifact could not be written
    #[error("Failed to write output: {0}")]
    Output(#[source] TableError),

    /// The run was cancelled by the caller
    #[error("Translation run cancelled")]
    Cancelled,
}
