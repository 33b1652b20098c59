/*!
 * Terminology dictionary and best-effort enforcement.
 *
 * The dictionary table has an `Original` column with the source term and one
 * column per language code holding the mandated translation. After a cell is
 * translated, every term found in the source text triggers a verification
 * call that asks the model which span of the translation renders the term.
 * The span is replaced only when the answer is usable; any failure leaves the
 * translation as it was.
 */

use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::TableError;
use crate::providers::{GenerationRequest, ModelOptions};
use crate::table::Table;

use super::retry::RetryingGenerator;

/// Source term column of the dictionary table
pub const DICTIONARY_TERM_COLUMN: &str = "Original";

/// Answer meaning "the term is not in the translation"
const NO_SPAN: &str = "NONE";

const VERIFY_SYSTEM_PROMPT: &str =
    "You are a meticulous bilingual terminology checker. You answer with an exact quote or NONE.";

/// A source term and its mandated translations by language code
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntry {
    pub term: String,
    pub translations: HashMap<String, String>,
}

/// Loaded terminology dictionary
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    /// Load from a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Self::from_table(&Table::read_csv(path)?)
    }

    /// Build from an already loaded table
    pub fn from_table(table: &Table) -> Result<Self, TableError> {
        table.require_columns(&[DICTIONARY_TERM_COLUMN])?;

        let codes: Vec<&String> = table
            .headers()
            .iter()
            .filter(|h| h.as_str() != DICTIONARY_TERM_COLUMN)
            .collect();

        let mut entries = Vec::new();
        for row in 0..table.row_count() {
            let term = table.get(row, DICTIONARY_TERM_COLUMN).unwrap_or_default().trim();
            if term.is_empty() {
                continue;
            }
            let translations = codes
                .iter()
                .filter_map(|code| {
                    let value = table.get(row, code)?.trim();
                    (!value.is_empty()).then(|| (code.to_string(), value.to_string()))
                })
                .collect();
            entries.push(DictionaryEntry { term: term.to_string(), translations });
        }

        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Terms present in `source` (case-insensitive) with a mandate for `code`
    pub fn matches<'a>(&'a self, source: &str, code: &str) -> Vec<(&'a str, &'a str)> {
        let haystack = source.to_lowercase();
        self.entries
            .iter()
            .filter(|e| haystack.contains(&e.term.to_lowercase()))
            .filter_map(|e| e.translations.get(code).map(|t| (e.term.as_str(), t.as_str())))
            .collect()
    }
}

/// Applies a [`Dictionary`] to translated text through verification calls
#[derive(Debug, Clone)]
pub struct TermEnforcer {
    dictionary: Dictionary,
    options: ModelOptions,
}

impl TermEnforcer {
    pub fn new(dictionary: Dictionary, options: ModelOptions) -> Self {
        Self { dictionary, options }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn verification_request(&self, source: &str, translated: &str, language: &str, term: &str) -> GenerationRequest {
        let user = format!(
            "Source text:\n{source}\n\nTranslation into {language}:\n{translated}\n\n\
             Which exact words in the translation correspond to the source term '{term}'?\n\
             Reply with only those words, copied exactly as they appear in the translation. \
             If the term is not rendered in the translation, reply {NO_SPAN}."
        );
        GenerationRequest::new(VERIFY_SYSTEM_PROMPT, user, self.options.clone())
    }

    /// Replace verified spans with mandated translations
    pub async fn enforce(
        &self,
        generator: &RetryingGenerator,
        source: &str,
        translated: String,
        language: &str,
        code: &str,
    ) -> String {
        let mut result = translated;

        for (term, mandated) in self.dictionary.matches(source, code) {
            let request = self.verification_request(source, &result, language, term);
            let span = match generator.generate(&request).await {
                Ok(answer) => clean_span(&answer),
                Err(e) => {
                    warn!("Term verification for '{}' failed, keeping translation: {}", term, e);
                    continue;
                }
            };

            match span {
                Some(span) if span != mandated && result.contains(span.as_str()) => {
                    debug!("Replacing '{}' with mandated '{}' for term '{}'", span, mandated, term);
                    result = result.replace(span.as_str(), mandated);
                }
                Some(_) => {}
                None => debug!("Term '{}' not confirmed in translation", term),
            }
        }

        result
    }
}

/// Usable span from a verification answer
fn clean_span(answer: &str) -> Option<String> {
    let span = answer.trim().trim_matches(|c| matches!(c, '"' | '\'' | '`')).trim();
    if span.is_empty() || span.eq_ignore_ascii_case(NO_SPAN) {
        None
    } else {
        Some(span.to_string())
    }
}
