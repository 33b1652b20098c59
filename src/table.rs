/*!
 * In-memory CSV table.
 *
 * Every cell is held as text, so identifier columns such as `SKU` are never
 * coerced to numbers and written back exactly as read. An empty string is the
 * "missing" value.
 */

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use crate::errors::TableError;

/// Header-addressed, row-oriented table of text cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let index = build_index(&headers);
        Self { headers, index, rows: Vec::new() }
    }

    /// Read a comma-separated file with a header row
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Read comma-separated content with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header_record = reader.headers()?.clone();
        if header_record.is_empty() || header_record.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::NoHeader);
        }
        let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(normalize_record(&record?, width));
        }

        let index = build_index(&headers);
        Ok(Self { headers, index, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Error unless every named column is present
    pub fn require_columns(&self, names: &[&str]) -> Result<(), TableError> {
        match names.iter().find(|name| !self.has_column(name)) {
            Some(missing) => Err(TableError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }

    /// Add an empty column unless it already exists; returns true when created
    pub fn ensure_column(&mut self, name: &str) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.headers.len());
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        true
    }

    /// Append a row, padding or truncating it to the table width
    pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Cell text; `None` when the row or column does not exist
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = *self.index.get(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Overwrite a cell; errors if the column is unknown
    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<(), TableError> {
        let col = *self
            .index
            .get(column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
        if let Some(cells) = self.rows.get_mut(row) {
            cells[col] = value.into();
        }
        Ok(())
    }

    /// All values of one column in row order
    pub fn column(&self, column: &str) -> Option<Vec<&str>> {
        let col = *self.index.get(column)?;
        Some(self.rows.iter().map(|r| r[col].as_str()).collect())
    }

    /// Write the selected columns, in the given order, to a CSV file
    pub fn write_columns(&self, path: impl AsRef<Path>, columns: &[&str]) -> Result<(), TableError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_columns_to(file, columns)
    }

    /// Write the selected columns, in the given order, to any writer
    pub fn write_columns_to<W: Write>(&self, writer: W, columns: &[&str]) -> Result<(), TableError> {
        let positions = columns
            .iter()
            .map(|name| {
                self.index
                    .get(*name)
                    .copied()
                    .ok_or_else(|| TableError::MissingColumn((*name).to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(columns)?;
        for row in &self.rows {
            writer.write_record(positions.iter().map(|&p| row[p].as_str()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn build_index(headers: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(headers.len());
    for (position, header) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers
        index.entry(header.clone()).or_insert(position);
    }
    index
}

fn normalize_record(record: &StringRecord, width: usize) -> Vec<String> {
    let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
    row.resize(width, String::new());
    row
}
