use std::collections::BTreeSet;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info};

use repclub_model::ParsedCsvData;

use crate::error::IngestError;

const BOM: char = '\u{feff}';

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(BOM);
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().to_string()
}

/// Make header names unique and non-blank. Row keys must be a closed set of
/// distinct names, so `Email,Email` becomes `Email,Email (2)` and a blank
/// third header becomes `Column 3`.
fn dedupe_headers(raw: Vec<String>, warnings: &mut Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (idx, header) in raw.into_iter().enumerate() {
        let base = if header.is_empty() {
            let name = format!("Column {}", idx + 1);
            warnings.push(format!("header {} is blank; renamed to \"{name}\"", idx + 1));
            name
        } else {
            header
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while seen.contains(&name.to_lowercase()) {
            name = format!("{base} ({suffix})");
            suffix += 1;
        }
        if name != base {
            warnings.push(format!("duplicate header \"{base}\" renamed to \"{name}\""));
        }
        seen.insert(name.to_lowercase());
        headers.push(name);
    }
    headers
}

/// Parse raw file bytes into headers and rows.
///
/// Fails only when the input is empty or cannot be decoded; malformed rows
/// are padded or truncated to the header width and reported in
/// [`ParsedCsvData::errors`]. The first non-blank record is the header.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<ParsedCsvData, IngestError> {
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::Unreadable {
        reason: format!("not valid UTF-8 ({e})"),
    })?;
    let text = text.strip_prefix(BOM).unwrap_or(text);
    if text.trim().is_empty() {
        return Err(IngestError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut warnings = Vec::new();
    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Unreadable {
            reason: e.to_string(),
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let Some(header_row) = headers.as_ref() else {
            let raw: Vec<String> = record.iter().map(normalize_header).collect();
            headers = Some(dedupe_headers(raw, &mut warnings));
            continue;
        };
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let expected = header_row.len();
        let found = record.len();
        if found < expected {
            warnings.push(format!(
                "row {line}: expected {expected} fields, found {found}; padded with empty values"
            ));
        } else if found > expected {
            warnings.push(format!(
                "row {line}: expected {expected} fields, found {found}; extra values dropped"
            ));
        }
        rows.push(record.iter().map(normalize_cell).collect());
    }

    let Some(headers) = headers else {
        return Err(IngestError::EmptyFile);
    };
    for warning in &warnings {
        debug!(%warning, "csv parse warning");
    }
    info!(
        columns = headers.len(),
        rows = rows.len(),
        warnings = warnings.len(),
        "parsed csv"
    );
    Ok(ParsedCsvData::new(headers, rows, warnings))
}

/// Read and parse a CSV file from disk.
pub fn read_csv_file(path: &Path) -> Result<ParsedCsvData, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read csv file");
    parse_csv_bytes(&bytes)
}
