//! Results of an import: summary counts, downloadable CSV reports, blank
//! templates, and the optional assistant summary.

#![deny(unsafe_code)]

pub mod error;
pub mod export;
pub mod summary;

pub use error::ReportError;
pub use export::{
    TEMPLATE_EXAMPLE_ROWS, error_report_csv, template_csv, validation_report_csv, write_report,
};
pub use summary::{ImportSummary, summarize};
