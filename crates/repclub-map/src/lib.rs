//! Column mapping: deterministic auto-mapping plus a mapping session that
//! layers assistant suggestions and manual edits on top.

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod score;
pub mod state;
pub mod utils;

pub use engine::{MappingEngine, MappingResult, ScoredMatch, auto_map};
pub use error::MappingError;
pub use score::{ACCEPT_THRESHOLD, AI_CONFIDENCE_MIN, TYPE_MISMATCH_PENALTY, score_field};
pub use state::{MappingSource, MappingState, MappingSummary};
pub use utils::normalize_name;
