use serde::Serialize;
use tracing::{debug, warn};

use repclub_model::{Assistant, ImportResult, ImportValidationResult, ModuleConfig, RowError};

/// Everything shown on the results screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub module: String,
    pub display_name: String,
    /// Data rows in the file.
    pub total_rows: usize,
    /// Rows rejected by validation and never submitted.
    pub invalid_rows: usize,
    pub duplicates: usize,
    /// Duplicates skipped because nobody decided on them.
    pub auto_skipped: usize,
    pub imported: usize,
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub success: bool,
    pub errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

impl ImportSummary {
    pub fn new(
        config: &ModuleConfig,
        validation: &ImportValidationResult,
        result: &ImportResult,
        auto_skipped: &[usize],
    ) -> Self {
        Self {
            module: config.module.clone(),
            display_name: config.display_name.clone(),
            total_rows: validation.total_rows(),
            invalid_rows: validation.invalid_rows.len(),
            duplicates: validation.duplicates.len(),
            auto_skipped: auto_skipped.len(),
            imported: result.imported,
            merged: result.merged,
            skipped: result.skipped,
            failed: result.failed,
            success: result.success(),
            errors: result.errors.clone(),
            ai_summary: None,
        }
    }

    pub fn with_ai_summary(mut self, summary: Option<String>) -> Self {
        self.ai_summary = summary;
        self
    }

    /// Rows handed to the executor.
    pub fn processed(&self) -> usize {
        self.imported + self.merged + self.skipped + self.failed
    }

    /// One-line outcome, e.g. `Members: 3 imported, 1 merged, 0 skipped, 1 failed`.
    pub fn headline(&self) -> String {
        format!(
            "{}: {} imported, {} merged, {} skipped, {} failed",
            self.display_name, self.imported, self.merged, self.skipped, self.failed
        )
    }

    /// Notes that need the user's attention, in display order.
    pub fn warnings(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.invalid_rows > 0 {
            notes.push(format!(
                "{} row(s) failed validation and were not imported",
                self.invalid_rows
            ));
        }
        if self.auto_skipped > 0 {
            notes.push(format!(
                "{} duplicate(s) had no decision and were skipped",
                self.auto_skipped
            ));
        }
        if !self.success {
            notes.push("every submitted row failed".to_string());
        }
        notes
    }
}

/// Ask the assistant for a prose summary. Any failure, or an empty reply,
/// yields `None`.
pub async fn summarize(
    assistant: &dyn Assistant,
    result: &ImportResult,
    config: &ModuleConfig,
) -> Option<String> {
    if !assistant.is_enabled() {
        return None;
    }
    match assistant.summarize(result, config).await {
        Ok(summary) if summary.trim().is_empty() => {
            debug!("assistant returned an empty summary");
            None
        }
        Ok(summary) => Some(summary.trim().to_string()),
        Err(error) => {
            warn!(%error, "assistant summary failed");
            None
        }
    }
}
