//! Import wizard as a chain of owned steps.
//!
//! Each step owns everything the user has produced so far. Moving forward
//! consumes the step and returns the next one; a rejected move hands the
//! untouched step back inside [`Rejected`]. `back` keeps the earlier step's
//! data, so returning from preview to mapping keeps every mapping edit.
//! Abandoning an import before it runs is just dropping the step.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use repclub_ingest::{IngestError, build_column_hints, parse_csv_bytes};
use repclub_map::MappingState;
use repclub_model::{
    Assistant, AssistantError, Destination, DuplicateRecord, ImportResult,
    ImportValidationResult, ModuleConfig, ParsedCsvData, TenantContext,
};
use repclub_validate::validate;

use crate::error::ImportError;
use crate::executor::ImportExecutor;
use crate::plan::ImportPlan;
use crate::resolver::DuplicateResolver;

/// Rows sent to the assistant when asking for mapping suggestions.
pub const ASSISTANT_SAMPLE_ROWS: usize = 5;

/// A transition that did not happen. `state` is the step as it was.
#[derive(Debug)]
pub struct Rejected<S> {
    pub state: S,
    pub error: ImportError,
}

impl<S> Rejected<S> {
    fn new(state: S, error: impl Into<ImportError>) -> Self {
        Self {
            state,
            error: error.into(),
        }
    }

    pub fn into_error(self) -> ImportError {
        self.error
    }
}

impl<S> fmt::Display for Rejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<S: fmt::Debug> std::error::Error for Rejected<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Waiting for a file.
#[derive(Debug, Clone)]
pub struct UploadStep {
    config: Arc<ModuleConfig>,
}

impl UploadStep {
    pub fn new(config: Arc<ModuleConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<ModuleConfig> {
        &self.config
    }

    /// Parse the file and auto-map its columns.
    ///
    /// An empty or unreadable file keeps the wizard on this step.
    pub fn load(self, bytes: &[u8]) -> Result<MappingStep, Rejected<UploadStep>> {
        let data = match parse_csv_bytes(bytes) {
            Ok(data) => data,
            Err(IngestError::EmptyFile) => return Err(Rejected::new(self, ImportError::EmptyFile)),
            Err(error) => return Err(Rejected::new(self, error)),
        };
        if data.is_empty() {
            return Err(Rejected::new(self, ImportError::EmptyFile));
        }
        info!(
            module = %self.config.module,
            rows = data.total_rows,
            warnings = data.errors.len(),
            "file loaded"
        );
        let hints = build_column_hints(&data);
        let mapping = MappingState::new(Arc::clone(&self.config), data.header_list(), hints);
        Ok(MappingStep {
            upload: self,
            data,
            mapping,
        })
    }
}

/// Reviewing and editing the column mapping.
#[derive(Debug, Clone)]
pub struct MappingStep {
    upload: UploadStep,
    data: ParsedCsvData,
    mapping: MappingState,
}

impl MappingStep {
    pub fn config(&self) -> &Arc<ModuleConfig> {
        self.upload.config()
    }

    pub fn data(&self) -> &ParsedCsvData {
        &self.data
    }

    pub fn mapping(&self) -> &MappingState {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut MappingState {
        &mut self.mapping
    }

    /// Best-effort assistant pass over the current mapping.
    pub async fn refine_with_assistant(
        &mut self,
        assistant: &dyn Assistant,
    ) -> Result<Vec<String>, AssistantError> {
        let sample = self.data.sample_rows(ASSISTANT_SAMPLE_ROWS);
        self.mapping.refine_with_assistant(assistant, sample).await
    }

    /// Validate every row against the destination.
    ///
    /// Refused while a required field is unmapped.
    pub async fn validate(
        self,
        destination: &dyn Destination,
        ctx: &TenantContext,
    ) -> Result<PreviewStep, Rejected<MappingStep>> {
        if let Err(error) = self.mapping.ensure_complete() {
            return Err(Rejected::new(self, error));
        }
        let result = validate(
            &self.data.rows,
            self.mapping.mapping(),
            self.mapping.config(),
            destination,
            ctx,
        )
        .await;
        match result {
            Ok(validation) => {
                info!(
                    valid = validation.valid_rows.len(),
                    invalid = validation.invalid_rows.len(),
                    duplicates = validation.duplicates.len(),
                    "validation finished"
                );
                Ok(PreviewStep {
                    mapping: self,
                    validation,
                })
            }
            Err(error) => Err(Rejected::new(self, error)),
        }
    }

    pub fn back(self) -> UploadStep {
        self.upload
    }
}

/// Showing the validation result.
#[derive(Debug, Clone)]
pub struct PreviewStep {
    mapping: MappingStep,
    validation: ImportValidationResult,
}

impl PreviewStep {
    pub fn config(&self) -> &Arc<ModuleConfig> {
        self.mapping.config()
    }

    pub fn data(&self) -> &ParsedCsvData {
        self.mapping.data()
    }

    pub fn mapping(&self) -> &MappingState {
        self.mapping.mapping()
    }

    pub fn validation(&self) -> &ImportValidationResult {
        &self.validation
    }

    /// Move on to duplicate review, or straight to importing when
    /// validation flagged no duplicates.
    pub fn proceed(self) -> WizardState {
        if self.validation.has_duplicates() {
            let resolver = DuplicateResolver::new(self.validation.duplicates.clone());
            WizardState::Duplicates(DuplicatesStep {
                preview: self,
                resolver,
            })
        } else {
            debug!("no duplicates; skipping review");
            WizardState::Importing(ImportingStep::new(
                Arc::clone(self.config()),
                self.validation,
                Vec::new(),
                Vec::new(),
            ))
        }
    }

    pub fn back(self) -> MappingStep {
        self.mapping
    }
}

/// Deciding what to do with each flagged duplicate.
#[derive(Debug, Clone)]
pub struct DuplicatesStep {
    preview: PreviewStep,
    resolver: DuplicateResolver,
}

impl DuplicatesStep {
    pub fn preview(&self) -> &PreviewStep {
        &self.preview
    }

    pub fn resolver(&self) -> &DuplicateResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut DuplicateResolver {
        &mut self.resolver
    }

    /// Lock in the decisions. Undecided duplicates become skips.
    pub fn confirm(self) -> ImportingStep {
        let finalized = self.resolver.finalize();
        let config = Arc::clone(self.preview.config());
        ImportingStep::new(
            config,
            self.preview.validation,
            finalized.duplicates,
            finalized.auto_skipped,
        )
    }

    /// Return to the preview. Decisions made here are discarded.
    pub fn back(self) -> PreviewStep {
        self.preview
    }
}

/// Ready to write.
#[derive(Debug, Clone)]
pub struct ImportingStep {
    config: Arc<ModuleConfig>,
    validation: ImportValidationResult,
    plan: ImportPlan,
    auto_skipped: Vec<usize>,
}

impl ImportingStep {
    fn new(
        config: Arc<ModuleConfig>,
        validation: ImportValidationResult,
        duplicates: Vec<DuplicateRecord>,
        auto_skipped: Vec<usize>,
    ) -> Self {
        let plan = ImportPlan::new(validation.valid_rows.clone(), duplicates);
        Self {
            config,
            validation,
            plan,
            auto_skipped,
        }
    }

    pub fn config(&self) -> &Arc<ModuleConfig> {
        &self.config
    }

    pub fn plan(&self) -> &ImportPlan {
        &self.plan
    }

    /// Duplicates nobody decided on, now skipped.
    pub fn auto_skipped(&self) -> &[usize] {
        &self.auto_skipped
    }

    /// Run the plan to completion. Only fails when the executor has already
    /// been used, in which case nothing is written.
    pub async fn run(
        self,
        executor: &mut ImportExecutor,
    ) -> Result<ResultsStep, Rejected<ImportingStep>> {
        match executor.run(self.plan.clone()).await {
            Ok(result) => Ok(ResultsStep {
                config: self.config,
                validation: self.validation,
                result,
                auto_skipped: self.auto_skipped,
            }),
            Err(error) => Err(Rejected::new(self, error)),
        }
    }
}

/// Finished import.
#[derive(Debug, Clone)]
pub struct ResultsStep {
    config: Arc<ModuleConfig>,
    validation: ImportValidationResult,
    result: ImportResult,
    auto_skipped: Vec<usize>,
}

impl ResultsStep {
    pub fn config(&self) -> &Arc<ModuleConfig> {
        &self.config
    }

    pub fn validation(&self) -> &ImportValidationResult {
        &self.validation
    }

    pub fn result(&self) -> &ImportResult {
        &self.result
    }

    pub fn auto_skipped(&self) -> &[usize] {
        &self.auto_skipped
    }
}

/// The wizard's current step.
#[derive(Debug, Clone)]
pub enum WizardState {
    Upload(UploadStep),
    Mapping(MappingStep),
    Preview(PreviewStep),
    Duplicates(DuplicatesStep),
    Importing(ImportingStep),
    Results(ResultsStep),
}

impl WizardState {
    pub fn new(config: Arc<ModuleConfig>) -> Self {
        WizardState::Upload(UploadStep::new(config))
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardState::Upload(_) => "upload",
            WizardState::Mapping(_) => "mapping",
            WizardState::Preview(_) => "preview",
            WizardState::Duplicates(_) => "duplicates",
            WizardState::Importing(_) => "importing",
            WizardState::Results(_) => "results",
        }
    }

    /// Previous step with its data intact. Upload has nothing before it, and
    /// once an import is planned or finished there is no way back.
    pub fn back(self) -> Result<WizardState, WizardState> {
        match self {
            WizardState::Mapping(step) => Ok(WizardState::Upload(step.back())),
            WizardState::Preview(step) => Ok(WizardState::Mapping(step.back())),
            WizardState::Duplicates(step) => Ok(WizardState::Preview(step.back())),
            other @ (WizardState::Upload(_)
            | WizardState::Importing(_)
            | WizardState::Results(_)) => Err(other),
        }
    }
}

impl From<UploadStep> for WizardState {
    fn from(step: UploadStep) -> Self {
        WizardState::Upload(step)
    }
}

impl From<MappingStep> for WizardState {
    fn from(step: MappingStep) -> Self {
        WizardState::Mapping(step)
    }
}

impl From<PreviewStep> for WizardState {
    fn from(step: PreviewStep) -> Self {
        WizardState::Preview(step)
    }
}

impl From<DuplicatesStep> for WizardState {
    fn from(step: DuplicatesStep) -> Self {
        WizardState::Duplicates(step)
    }
}

impl From<ImportingStep> for WizardState {
    fn from(step: ImportingStep) -> Self {
        WizardState::Importing(step)
    }
}

impl From<ResultsStep> for WizardState {
    fn from(step: ResultsStep) -> Self {
        WizardState::Results(step)
    }
}
