//! Downloadable CSV exports.
//!
//! Row numbers in every report are 1-based data rows, the numbering users
//! see in the preview.

use std::path::Path;

use csv::Writer;
use tracing::debug;

use repclub_model::{ImportResult, ImportValidationResult, ModuleConfig};

use crate::error::ReportError;

/// Example rows written into a template.
pub const TEMPLATE_EXAMPLE_ROWS: usize = 2;

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ReportError> {
    let bytes = writer
        .into_inner()
        .map_err(|error| csv::Error::from(error.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// `Row,Error` lines for every failed write.
pub fn error_report_csv(result: &ImportResult) -> Result<String, ReportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["Row", "Error"])?;
    for error in &result.errors {
        writer.write_record([(error.row_index + 1).to_string(), error.error.clone()])?;
    }
    finish(writer)
}

/// `Row,Error` lines for rows rejected before import, one line per error.
pub fn validation_report_csv(validation: &ImportValidationResult) -> Result<String, ReportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["Row", "Error"])?;
    for row in &validation.invalid_rows {
        let line = (row.row_index + 1).to_string();
        for error in &row.errors {
            writer.write_record([line.as_str(), error.as_str()])?;
        }
    }
    finish(writer)
}

/// Blank import template: field names as headers plus up to two example
/// rows. Fields with fewer examples get empty cells.
pub fn template_csv(config: &ModuleConfig) -> Result<String, ReportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(config.fields.iter().map(|field| field.name.as_str()))?;

    let example_rows = config
        .fields
        .iter()
        .map(|field| field.examples.len())
        .max()
        .unwrap_or(0)
        .min(TEMPLATE_EXAMPLE_ROWS);
    for idx in 0..example_rows {
        writer.write_record(
            config
                .fields
                .iter()
                .map(|field| field.examples.get(idx).map_or("", String::as_str)),
        )?;
    }
    finish(writer)
}

/// Write a report to disk.
pub fn write_report(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}
