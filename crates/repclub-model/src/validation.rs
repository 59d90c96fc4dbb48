use serde::{Deserialize, Serialize};

use crate::duplicate::DuplicateRecord;
use crate::value::TransformedRow;

/// A row that passed every check and matched no existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidRow {
    pub row_index: usize,
    pub data: TransformedRow,
}

/// A row with at least one validation error. Never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidRow {
    pub row_index: usize,
    pub errors: Vec<String>,
}

/// Where a source row ended up after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBucket {
    Valid,
    Invalid,
    Duplicate,
}

/// Partition of all source rows into valid, invalid and duplicate buckets.
///
/// Every source row index lands in exactly one bucket. Invalidity is checked
/// first and is terminal, so an invalid row is never a duplicate candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportValidationResult {
    pub is_valid: bool,
    pub valid_rows: Vec<ValidRow>,
    pub invalid_rows: Vec<InvalidRow>,
    pub duplicates: Vec<DuplicateRecord>,
}

impl ImportValidationResult {
    pub fn total_rows(&self) -> usize {
        self.valid_rows.len() + self.invalid_rows.len() + self.duplicates.len()
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Rows that can still be written (valid rows plus duplicates).
    pub fn importable_rows(&self) -> usize {
        self.valid_rows.len() + self.duplicates.len()
    }

    pub fn row_bucket(&self, row_index: usize) -> Option<RowBucket> {
        if self.valid_rows.iter().any(|row| row.row_index == row_index) {
            Some(RowBucket::Valid)
        } else if self.invalid_rows.iter().any(|row| row.row_index == row_index) {
            Some(RowBucket::Invalid)
        } else if self
            .duplicates
            .iter()
            .any(|row| row.import_row_index == row_index)
        {
            Some(RowBucket::Duplicate)
        } else {
            None
        }
    }
}
