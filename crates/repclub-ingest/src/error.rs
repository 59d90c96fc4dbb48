use std::path::PathBuf;

/// Session-aborting parse failures. Ragged rows and renamed headers are
/// warnings on the parsed data, not errors.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("file appears to be empty")]
    EmptyFile,

    #[error("file could not be read as CSV: {reason}")]
    Unreadable { reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
