#![deny(unsafe_code)]

use std::path::PathBuf;

use repclub_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML module file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid module config in {path}: {source}")]
    InvalidModule {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("unknown module '{module}' (available: {available})")]
    UnknownModule { module: String, available: String },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
