//! Collects merge/create/skip decisions for flagged duplicates.

use tracing::{debug, warn};

use repclub_model::{DuplicateRecord, Resolution};

use crate::error::ImportError;

/// Decision counts over the current set of duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionCounts {
    pub merge: usize,
    pub create: usize,
    pub skip: usize,
    pub pending: usize,
}

/// Resolved duplicates ready for the executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalizedDuplicates {
    /// Every duplicate, each with a resolution set.
    pub duplicates: Vec<DuplicateRecord>,
    /// Rows nobody decided on, defaulted to skip.
    pub auto_skipped: Vec<usize>,
}

/// Per-session duplicate review.
///
/// Bulk and single-row decisions simply overwrite the stored resolution, so
/// whichever happened last wins.
#[derive(Debug, Clone, Default)]
pub struct DuplicateResolver {
    duplicates: Vec<DuplicateRecord>,
}

impl DuplicateResolver {
    pub fn new(duplicates: Vec<DuplicateRecord>) -> Self {
        Self { duplicates }
    }

    pub fn duplicates(&self) -> &[DuplicateRecord] {
        &self.duplicates
    }

    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }

    pub fn get(&self, row_index: usize) -> Option<&DuplicateRecord> {
        self.duplicates
            .iter()
            .find(|duplicate| duplicate.import_row_index == row_index)
    }

    /// Apply one decision to every duplicate.
    pub fn resolve_all(&mut self, resolution: Resolution) {
        for duplicate in &mut self.duplicates {
            duplicate.resolution = Some(resolution);
        }
        debug!(%resolution, count = self.duplicates.len(), "bulk resolution");
    }

    /// Decide a single row, replacing any earlier bulk or single decision.
    pub fn resolve(&mut self, row_index: usize, resolution: Resolution) -> Result<(), ImportError> {
        let duplicate = self.find_mut(row_index)?;
        duplicate.resolution = Some(resolution);
        debug!(row_index, %resolution, "row resolution");
        Ok(())
    }

    /// Forget the decision for one row.
    pub fn clear(&mut self, row_index: usize) -> Result<(), ImportError> {
        self.find_mut(row_index)?.resolution = None;
        Ok(())
    }

    /// Row indices still without a decision, in file order.
    pub fn pending(&self) -> Vec<usize> {
        let mut pending: Vec<usize> = self
            .duplicates
            .iter()
            .filter(|duplicate| !duplicate.is_resolved())
            .map(|duplicate| duplicate.import_row_index)
            .collect();
        pending.sort_unstable();
        pending
    }

    pub fn counts(&self) -> ResolutionCounts {
        let mut counts = ResolutionCounts::default();
        for duplicate in &self.duplicates {
            match duplicate.resolution {
                Some(Resolution::Merge) => counts.merge += 1,
                Some(Resolution::Create) => counts.create += 1,
                Some(Resolution::Skip) => counts.skip += 1,
                None => counts.pending += 1,
            }
        }
        counts
    }

    /// Default every undecided duplicate to skip.
    ///
    /// Auto-skipped rows are logged and returned so the caller can tell the
    /// user that some rows were not imported without a decision.
    pub fn finalize(self) -> FinalizedDuplicates {
        let mut auto_skipped = Vec::new();
        let mut duplicates = self.duplicates;
        for duplicate in &mut duplicates {
            if duplicate.resolution.is_none() {
                duplicate.resolution = Some(Resolution::Skip);
                auto_skipped.push(duplicate.import_row_index);
            }
        }
        auto_skipped.sort_unstable();
        if !auto_skipped.is_empty() {
            warn!(
                count = auto_skipped.len(),
                "unreviewed duplicates default to skip"
            );
        }
        FinalizedDuplicates {
            duplicates,
            auto_skipped,
        }
    }

    fn find_mut(&mut self, row_index: usize) -> Result<&mut DuplicateRecord, ImportError> {
        self.duplicates
            .iter_mut()
            .find(|duplicate| duplicate.import_row_index == row_index)
            .ok_or(ImportError::UnknownDuplicate { row_index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repclub_model::{ExternalRecord, RecordId, TransformedRow};

    fn duplicate(row_index: usize) -> DuplicateRecord {
        DuplicateRecord {
            import_row_index: row_index,
            import_data: TransformedRow::new(),
            existing_record: ExternalRecord {
                id: RecordId::new(format!("m-{row_index}")),
                fields: TransformedRow::new(),
            },
            matched_fields: vec!["email".to_string()],
            resolution: None,
        }
    }

    #[test]
    fn last_write_wins_between_bulk_and_single() {
        let mut resolver = DuplicateResolver::new(vec![duplicate(1), duplicate(4)]);
        resolver.resolve(4, Resolution::Create).unwrap();
        resolver.resolve_all(Resolution::Merge);
        assert_eq!(resolver.get(4).unwrap().resolution, Some(Resolution::Merge));

        resolver.resolve(1, Resolution::Skip).unwrap();
        assert_eq!(
            resolver.counts(),
            ResolutionCounts {
                merge: 1,
                skip: 1,
                ..ResolutionCounts::default()
            }
        );
    }

    #[test]
    fn unknown_rows_are_rejected() {
        let mut resolver = DuplicateResolver::new(vec![duplicate(2)]);
        assert!(matches!(
            resolver.resolve(3, Resolution::Merge),
            Err(ImportError::UnknownDuplicate { row_index: 3 })
        ));
    }

    #[test]
    fn finalize_defaults_to_skip_and_reports_it() {
        let mut resolver = DuplicateResolver::new(vec![duplicate(5), duplicate(2), duplicate(7)]);
        resolver.resolve(2, Resolution::Merge).unwrap();
        resolver.resolve(7, Resolution::Create).unwrap();
        resolver.clear(7).unwrap();
        assert_eq!(resolver.pending(), vec![5, 7]);

        let finalized = resolver.finalize();
        assert_eq!(finalized.auto_skipped, vec![5, 7]);
        assert!(finalized.duplicates.iter().all(DuplicateRecord::is_resolved));
        let resolutions: Vec<_> = finalized
            .duplicates
            .iter()
            .map(|duplicate| duplicate.resolution)
            .collect();
        assert_eq!(
            resolutions,
            vec![
                Some(Resolution::Skip),
                Some(Resolution::Merge),
                Some(Resolution::Skip)
            ]
        );
    }
}
