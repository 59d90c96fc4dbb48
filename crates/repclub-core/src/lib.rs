//! Import orchestration on top of parsing, mapping and validation:
//! duplicate review, the sequential executor, the wizard steps, and the
//! bundled destination and assistant implementations.

#![deny(unsafe_code)]

pub mod assistant;
pub mod error;
pub mod executor;
pub mod memory;
pub mod merge;
pub mod plan;
pub mod resolver;
pub mod wizard;

pub use assistant::{
    AssistantSettings, CompletionAssistant, NoopAssistant, build_mapping_prompt,
    build_summary_prompt, parse_mapping_response,
};
pub use error::ImportError;
pub use executor::{ExecutorState, ImportExecutor, ImportProgress, ProgressCallback};
pub use memory::MemoryDestination;
pub use merge::{merge_changes, merge_record};
pub use plan::{ImportPlan, PlannedRow, RowAction};
pub use resolver::{DuplicateResolver, FinalizedDuplicates, ResolutionCounts};
pub use wizard::{
    DuplicatesStep, ImportingStep, MappingStep, PreviewStep, Rejected, ResultsStep, UploadStep,
    WizardState,
};
