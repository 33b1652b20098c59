use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Per-language artifact name, e.g. translated_descriptions_German.csv
    pub fn language_artifact_name(kind: &str, language: &str) -> String {
        format!("translated_{}_{}.csv", kind, language)
    }

    // @generates: Combined artifact name, e.g. translated_descriptions_all.csv
    pub fn combined_artifact_name(kind: &str) -> String {
        format!("translated_{}_all.csv", kind)
    }

    /// Resolve a downloadable artifact by name inside the output directory.
    ///
    /// Names containing path separators or parent references are rejected so a
    /// caller can only reach files the pipeline wrote.
    pub fn artifact_path<P: AsRef<Path>>(output_dir: P, file_name: &str) -> Option<PathBuf> {
        Self::output_path(output_dir, file_name).filter(|path| Self::file_exists(path))
    }

    /// Where an artifact with this name is written; `None` unless it is a plain file name
    pub fn output_path<P: AsRef<Path>>(output_dir: P, file_name: &str) -> Option<PathBuf> {
        let candidate = Path::new(file_name);
        let is_plain_name = candidate.components().count() == 1
            && candidate.file_name().is_some_and(|n| n == candidate.as_os_str());
        is_plain_name.then(|| output_dir.as_ref().join(file_name))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }
}
