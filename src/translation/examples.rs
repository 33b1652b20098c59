/*!
 * Curated display-name translations used as few-shot prompt context.
 *
 * The examples table has a `Display Name` column plus one
 * `Display name - <code>` column per language. It is read once per run and
 * never modified.
 */

use std::path::Path;

use crate::errors::TableError;
use crate::table::Table;

/// Source column of the examples table
pub const EXAMPLE_SOURCE_COLUMN: &str = "Display Name";

/// One known-good translation
#[derive(Debug, Clone, PartialEq)]
pub struct ExamplePair {
    pub original: String,
    pub translated: String,
}

/// Loaded examples table
#[derive(Debug, Clone)]
pub struct ExamplesTable {
    table: Table,
}

impl ExamplesTable {
    /// Load from a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Self::from_table(Table::read_csv(path)?)
    }

    /// Wrap an already loaded table
    pub fn from_table(table: Table) -> Result<Self, TableError> {
        table.require_columns(&[EXAMPLE_SOURCE_COLUMN])?;
        Ok(Self { table })
    }

    /// Column holding translations for a language code
    pub fn column_for(code: &str) -> String {
        format!("Display name - {}", code)
    }

    /// Language codes that have an example column
    pub fn codes(&self) -> Vec<String> {
        self.table
            .headers()
            .iter()
            .filter_map(|h| h.strip_prefix("Display name - "))
            .map(|code| code.trim().to_string())
            .collect()
    }

    /// Up to `max` pairs for a language, skipping rows where either side is blank
    pub fn examples_for(&self, code: &str, max: usize) -> Vec<ExamplePair> {
        let target_column = Self::column_for(code);
        let (Some(originals), Some(translations)) = (
            self.table.column(EXAMPLE_SOURCE_COLUMN),
            self.table.column(&target_column),
        ) else {
            return Vec::new();
        };

        originals
            .into_iter()
            .zip(translations)
            .filter(|(o, t)| !o.trim().is_empty() && !t.trim().is_empty())
            .take(max)
            .map(|(o, t)| ExamplePair {
                original: o.trim().to_string(),
                translated: t.trim().to_string(),
            })
            .collect()
    }
}

/// Render pairs as prompt lines
pub fn format_examples(pairs: &[ExamplePair]) -> String {
    pairs
        .iter()
        .map(|p| format!("Original: {} -> Translated: {}", p.original, p.translated))
        .collect::<Vec<_>>()
        .join("\n")
}
