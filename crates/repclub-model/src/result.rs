use serde::{Deserialize, Serialize};

/// A write failure attached to its source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 0-based source row index.
    pub row_index: usize,
    pub error: String,
}

/// What happened to one row during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "error", rename_all = "lowercase")]
pub enum RowOutcome {
    Imported,
    Merged,
    Skipped,
    Failed(String),
}

impl RowOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RowOutcome::Imported => "imported",
            RowOutcome::Merged => "merged",
            RowOutcome::Skipped => "skipped",
            RowOutcome::Failed(_) => "failed",
        }
    }
}

/// Running and final counters of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported: usize,
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

impl ImportResult {
    pub fn record(&mut self, row_index: usize, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Imported => self.imported += 1,
            RowOutcome::Merged => self.merged += 1,
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Failed(error) => {
                self.failed += 1;
                self.errors.push(RowError { row_index, error });
            }
        }
    }

    pub fn total_processed(&self) -> usize {
        self.imported + self.merged + self.skipped + self.failed
    }

    /// Partial success still counts; only an all-failed run is unsuccessful.
    pub fn success(&self) -> bool {
        self.failed == 0 || self.failed < self.total_processed()
    }
}
