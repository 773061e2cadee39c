//! Data loading utilities

use crate::error::{Result, RookiecastError};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Loader for the tabular player-statistics input
pub struct DataLoader {
    delimiter: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new loader with comma delimiter
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Override the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a delimited file with a header row
    pub fn load_csv(&self, path: &str) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| RookiecastError::DataError(format!("cannot open '{}': {}", path, e)))?;

        let parse_opts = CsvParseOptions::default().with_separator(self.delimiter);

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| RookiecastError::DataError(e.to_string()))
    }

    /// Pick the delimiter from the extension (.tsv = tab) and load
    pub fn load_auto(&self, path: &str) -> Result<DataFrame> {
        let delimiter = if path.to_lowercase().ends_with(".tsv") {
            b'\t'
        } else {
            self.delimiter
        };
        Self { delimiter }.load_csv(path)
    }

    /// Read only the header row: column names without loading the data.
    /// Used for the pre-load schema log line.
    pub fn peek_header(&self, path: &str) -> Result<Vec<String>> {
        let file = File::open(path)
            .map_err(|e| RookiecastError::DataError(format!("cannot open '{}': {}", path, e)))?;
        let reader = BufReader::new(file);
        let header = reader
            .lines()
            .next()
            .transpose()
            .map_err(|e| RookiecastError::DataError(e.to_string()))?
            .unwrap_or_default();

        Ok(header
            .split(self.delimiter as char)
            .map(|s| s.trim().to_string())
            .collect())
    }
}
