#![deny(unsafe_code)]

use std::sync::Arc;

/// One data line of a parsed CSV file.
///
/// Keys are closed over at parse time: every row of a file shares the same
/// header list and holds exactly one value per header, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl CsvRow {
    /// Build a row, padding or truncating `values` to the header count.
    pub fn new(headers: Arc<[String]>, mut values: Vec<String>) -> Self {
        values.resize(headers.len(), String::new());
        Self { headers, values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|header| header == column)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterate `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.trim().is_empty())
    }
}

/// Output of the CSV parser. Immutable after parsing.
#[derive(Debug, Clone)]
pub struct ParsedCsvData {
    pub headers: Arc<[String]>,
    /// One entry per data line, in file order.
    pub rows: Vec<CsvRow>,
    pub total_rows: usize,
    /// Non-fatal parse warnings (ragged rows, renamed headers).
    pub errors: Vec<String>,
}

impl ParsedCsvData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, errors: Vec<String>) -> Self {
        let headers: Arc<[String]> = headers.into();
        let rows: Vec<CsvRow> = rows
            .into_iter()
            .map(|values| CsvRow::new(Arc::clone(&headers), values))
            .collect();
        Self {
            total_rows: rows.len(),
            headers,
            rows,
            errors,
        }
    }

    pub fn header_list(&self) -> Vec<String> {
        self.headers.to_vec()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }

    /// First `count` rows, for previews and assistant prompts.
    pub fn sample_rows(&self, count: usize) -> &[CsvRow] {
        &self.rows[..self.rows.len().min(count)]
    }
}
