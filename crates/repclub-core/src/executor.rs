//! Sequential import executor.
//!
//! Rows are written one at a time in file order, because a later row may
//! collide with a record an earlier row just created. A failed write is
//! recorded against its row and the run moves on.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use repclub_model::{
    Destination, ImportResult, ModuleConfig, RowOutcome, TenantContext,
};

use crate::error::ImportError;
use crate::merge::merge_changes;
use crate::plan::{ImportPlan, PlannedRow, RowAction};

/// Lifecycle of one executor: `Idle -> Running -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Running,
    Completed,
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutorState::Idle => "idle",
            ExecutorState::Running => "running",
            ExecutorState::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Reported after every row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportProgress {
    /// Rows processed so far (1-based).
    pub current: usize,
    pub total: usize,
    pub row_index: usize,
    pub outcome: RowOutcome,
    pub message: String,
}

/// Progress callback for import runs.
pub type ProgressCallback = Box<dyn Fn(ImportProgress) + Send + Sync>;

pub struct ImportExecutor {
    destination: Arc<dyn Destination>,
    ctx: TenantContext,
    table: String,
    state: ExecutorState,
    progress_callback: Option<ProgressCallback>,
}

impl ImportExecutor {
    pub fn new(destination: Arc<dyn Destination>, ctx: TenantContext, config: &ModuleConfig) -> Self {
        Self {
            destination,
            ctx,
            table: config.table_name.clone(),
            state: ExecutorState::Idle,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    fn report_progress(&self, progress: ImportProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(progress);
        }
    }

    /// Execute every planned row.
    ///
    /// Only an executor that has never run may start; calling `run` again
    /// returns [`ImportError::ExecutorBusy`] without writing anything.
    pub async fn run(&mut self, plan: ImportPlan) -> Result<ImportResult, ImportError> {
        if self.state != ExecutorState::Idle {
            return Err(ImportError::ExecutorBusy { state: self.state });
        }
        self.state = ExecutorState::Running;
        let total = plan.len();
        info!(table = %self.table, rows = total, "import started");

        let mut result = ImportResult::default();
        for (idx, row) in plan.into_iter().enumerate() {
            let row_index = row.row_index;
            let (outcome, message) = self.execute_row(row).await;
            debug!(row_index, outcome = outcome.label(), "row processed");
            result.record(row_index, outcome.clone());
            self.report_progress(ImportProgress {
                current: idx + 1,
                total,
                row_index,
                outcome,
                message,
            });
        }

        self.state = ExecutorState::Completed;
        info!(
            imported = result.imported,
            merged = result.merged,
            skipped = result.skipped,
            failed = result.failed,
            "import finished"
        );
        Ok(result)
    }

    async fn execute_row(&self, row: PlannedRow) -> (RowOutcome, String) {
        let line = row.row_index + 1;
        match row.action {
            RowAction::Skip => (RowOutcome::Skipped, format!("Skipped row {line}")),
            RowAction::Insert => {
                match self
                    .destination
                    .insert(&self.ctx, &self.table, &row.data)
                    .await
                {
                    Ok(id) => (RowOutcome::Imported, format!("Imported row {line} as {id}")),
                    Err(error) => {
                        warn!(row_index = row.row_index, %error, "insert failed");
                        let message = format!("Row {line} failed: {error}");
                        (RowOutcome::Failed(error.to_string()), message)
                    }
                }
            }
            RowAction::Merge { existing } => {
                let changes = merge_changes(&existing, &row.data);
                if changes.is_empty() {
                    return (
                        RowOutcome::Merged,
                        format!("Row {line} already matches {}", existing.id),
                    );
                }
                match self
                    .destination
                    .update(&self.ctx, &self.table, &existing.id, &changes)
                    .await
                {
                    Ok(()) => (
                        RowOutcome::Merged,
                        format!("Merged row {line} into {}", existing.id),
                    ),
                    Err(error) => {
                        warn!(row_index = row.row_index, %error, "merge failed");
                        let message = format!("Row {line} failed: {error}");
                        (RowOutcome::Failed(error.to_string()), message)
                    }
                }
            }
        }
    }
}
