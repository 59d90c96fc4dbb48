//! Error types for mapping operations.

/// Errors from manual mapping edits and mapping completeness checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("field '{field}' is not part of module '{module}'")]
    FieldNotFound { module: String, field: String },

    #[error("field '{field}' is already mapped from column '{column}'")]
    FieldAlreadyMapped { field: String, column: String },

    #[error("required fields are not mapped: {}", fields.join(", "))]
    MissingRequired { fields: Vec<String> },
}
