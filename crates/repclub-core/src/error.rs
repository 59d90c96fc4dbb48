use std::path::PathBuf;

use thiserror::Error;

use repclub_ingest::IngestError;
use repclub_map::MappingError;
use repclub_validate::ValidateError;

use crate::executor::ExecutorState;

/// Session-level failures. Row problems never surface here; they are
/// collected in validation and import results.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file appears to be empty")]
    EmptyFile,

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error("row {} is not a flagged duplicate", .row_index + 1)]
    UnknownDuplicate { row_index: usize },

    #[error("import executor is {state}; a run can only start from idle")]
    ExecutorBusy { state: ExecutorState },

    #[error("failed to access store file {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not valid: {source}")]
    StoreFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
