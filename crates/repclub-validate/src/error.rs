use thiserror::Error;

/// Inconsistent validation inputs. Per-row problems are reported in the
/// validation result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
    #[error("mapping refers to column '{column}' which is not in the file")]
    UnknownColumn { column: String },

    #[error("mapping targets field '{field}' which module '{module}' does not declare")]
    UnknownField { module: String, field: String },
}
