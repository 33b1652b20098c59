/*!
 * Language name/code table.
 *
 * The table is a JSON object mapping short codes to human-readable names,
 * e.g. `{"sv": "Swedish", "de": "German"}`. The pipeline resolves the names a
 * caller selects into the codes used for column names.
 */

use isolang::Language;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::LanguageConfigError;

/// Resolves human-readable language names to short codes
pub trait LanguageResolver: Send + Sync + std::fmt::Debug {
    /// Code for a language name, if one is configured
    fn resolve(&self, name: &str) -> Option<String>;
}

/// In-memory code → name table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageTable {
    by_code: BTreeMap<String, String>,
}

impl LanguageTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (code, name) pairs
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        Self {
            by_code: pairs.into_iter().map(|(c, n)| (c.into(), n.into())).collect(),
        }
    }

    /// Load a table from a JSON file; a missing file yields an empty table
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LanguageConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Language config {:?} not found, using empty table", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let by_code: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self { by_code })
    }

    /// Save the table as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LanguageConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.by_code)?;
        std::fs::write(path, json)?;
        info!("Language config saved with {} entries", self.by_code.len());
        Ok(())
    }

    /// Name configured for a code
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.by_code.insert(code.into(), name.into());
    }

    /// Remove a mapping, returning the name it had
    pub fn remove(&mut self, code: &str) -> Option<String> {
        self.by_code.remove(code)
    }

    /// All (code, name) entries ordered by code
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_code.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Names of the configured languages among `codes`, in the given order
    pub fn available_languages<S: AsRef<str>>(&self, codes: &[S]) -> Vec<String> {
        codes
            .iter()
            .filter_map(|code| self.name_for(code.as_ref().trim()))
            .map(str::to_string)
            .collect()
    }
}

impl LanguageResolver for LanguageTable {
    fn resolve(&self, name: &str) -> Option<String> {
        self.by_code
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(code, _)| code.clone())
    }
}

/// Shared, file-backed language table
///
/// Reads go through an in-memory copy; `save` persists and replaces it.
#[derive(Debug, Clone)]
pub struct LanguageConfigStore {
    path: PathBuf,
    table: Arc<RwLock<LanguageTable>>,
}

impl LanguageConfigStore {
    /// Open the store, loading the table from `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LanguageConfigError> {
        let path = path.into();
        let table = LanguageTable::load(&path)?;
        Ok(Self {
            path,
            table: Arc::new(RwLock::new(table)),
        })
    }

    /// Snapshot of the current table
    pub fn snapshot(&self) -> LanguageTable {
        self.table.read().clone()
    }

    /// Replace the whole table and persist it
    pub fn save(&self, table: LanguageTable) -> Result<(), LanguageConfigError> {
        let mut guard = self.table.write();
        table.save(&self.path)?;
        *guard = table;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LanguageResolver for LanguageConfigStore {
    fn resolve(&self, name: &str) -> Option<String> {
        self.table.read().resolve(name)
    }
}

/// ISO 639-1 code for an English language name (e.g. "German" → "de")
pub fn suggest_code(name: &str) -> Option<String> {
    Language::from_name(name.trim())
        .and_then(|lang| lang.to_639_1())
        .map(str::to_string)
}
