/*!
 * Progress events emitted by a translation run.
 *
 * Each event serializes to one JSON object; absent fields are omitted. A run
 * ends with exactly one of:
 * - a final event with `complete: true` (success)
 * - a fatal event carrying only `error`
 */

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Progress value: a percentage or the `"no_examples"` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Percent(u8),
    NoExamples,
}

const NO_EXAMPLES_LABEL: &str = "no_examples";

impl Serialize for Progress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Progress::Percent(p) => serializer.serialize_u8(*p),
            Progress::NoExamples => serializer.serialize_str(NO_EXAMPLES_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Label(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(p) => Ok(Progress::Percent(p)),
            Raw::Label(label) if label == NO_EXAMPLES_LABEL => Ok(Progress::NoExamples),
            Raw::Label(other) => Err(de::Error::custom(format!("unknown progress label '{}'", other))),
        }
    }
}

/// A per-language artifact reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedFile {
    pub language: String,
    pub file: String,
}

/// One progress-stream message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_files: Option<Vec<CompletedFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_languages: Option<Vec<String>>,
}

impl ProgressEvent {
    /// A row of a language was processed
    pub fn progress(language: &str, percent: u8, batch: String) -> Self {
        Self {
            language: Some(language.to_string()),
            progress: Some(Progress::Percent(percent)),
            batch: Some(batch),
            ..Default::default()
        }
    }

    /// A language was skipped for lack of examples
    pub fn no_examples(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            progress: Some(Progress::NoExamples),
            ..Default::default()
        }
    }

    /// A single cell failed
    pub fn cell_error(language: &str, index: usize, message: impl std::fmt::Display) -> Self {
        Self::language_error(language, format!("Error at index {}: {}", index, message))
    }

    /// Something failed for a language outside individual cells
    pub fn language_error(language: &str, message: impl Into<String>) -> Self {
        Self {
            language: Some(language.to_string()),
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// A language finished and its artifact was written
    pub fn language_complete(language: &str, file: &str, completed_files: &[CompletedFile]) -> Self {
        Self {
            language: Some(language.to_string()),
            progress: Some(Progress::Percent(100)),
            status: Some("complete".to_string()),
            file: Some(file.to_string()),
            completed_files: Some(completed_files.to_vec()),
            ..Default::default()
        }
    }

    /// The run finished and the combined artifact was written
    pub fn run_complete(file: &str, completed_files: Vec<CompletedFile>, completed_languages: Vec<String>) -> Self {
        Self {
            file: Some(file.to_string()),
            complete: Some(true),
            completed_files: Some(completed_files),
            completed_languages: Some(completed_languages),
            ..Default::default()
        }
    }

    /// The run aborted
    pub fn fatal(message: impl std::fmt::Display) -> Self {
        Self {
            error: Some(format!("Fatal error in translation process: {}", message)),
            ..Default::default()
        }
    }

    /// Final success event
    pub fn is_final(&self) -> bool {
        self.complete == Some(true)
    }

    /// Run-level error with no language attached
    pub fn is_fatal(&self) -> bool {
        self.error.is_some() && self.language.is_none()
    }

    /// Percentage, if this is a numeric progress event
    pub fn percent(&self) -> Option<u8> {
        match self.progress {
            Some(Progress::Percent(p)) => Some(p),
            _ => None,
        }
    }

    /// One newline-terminated JSON line
    pub fn to_ndjson(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Percentage of rows done after processing `index` (0-based) of `total`
pub fn percent_done(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (((index + 1) * 100) / total).min(100) as u8
}
