use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("module '{module}': field '{field}' is declared more than once")]
    DuplicateField { module: String, field: String },
    #[error("module '{module}': duplicate key '{key}' is not a declared field")]
    UnknownDuplicateKey { module: String, key: String },
    #[error("module '{module}': display field '{field}' is not a declared field")]
    UnknownDisplayField { module: String, field: String },
    #[error("module '{module}': select field '{field}' has no options")]
    EmptyOptions { module: String, field: String },
    #[error("module '{module}' declares no fields")]
    NoFields { module: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
