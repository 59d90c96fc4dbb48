use repclub_model::{
    DuplicateRecord, ExternalRecord, Resolution, TransformedRow, ValidRow,
};

/// Write to perform for one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowAction {
    Insert,
    Merge { existing: ExternalRecord },
    Skip,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Insert => "insert",
            RowAction::Merge { .. } => "merge",
            RowAction::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRow {
    pub row_index: usize,
    pub data: TransformedRow,
    pub action: RowAction,
}

/// Ordered rows handed to the executor: valid rows become inserts and
/// duplicates follow their resolution. Sorted by source row index so writes
/// happen in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    rows: Vec<PlannedRow>,
}

impl ImportPlan {
    /// Build a plan. A duplicate still lacking a resolution is skipped.
    pub fn new(valid_rows: Vec<ValidRow>, duplicates: Vec<DuplicateRecord>) -> Self {
        let mut rows: Vec<PlannedRow> = valid_rows
            .into_iter()
            .map(|row| PlannedRow {
                row_index: row.row_index,
                data: row.data,
                action: RowAction::Insert,
            })
            .collect();
        rows.extend(duplicates.into_iter().map(|duplicate| {
            let action = match duplicate.resolution {
                Some(Resolution::Merge) => RowAction::Merge {
                    existing: duplicate.existing_record,
                },
                Some(Resolution::Create) => RowAction::Insert,
                Some(Resolution::Skip) | None => RowAction::Skip,
            };
            PlannedRow {
                row_index: duplicate.import_row_index,
                data: duplicate.import_data,
                action,
            }
        }));
        rows.sort_by_key(|row| row.row_index);
        Self { rows }
    }

    pub fn rows(&self) -> &[PlannedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for ImportPlan {
    type Item = PlannedRow;
    type IntoIter = std::vec::IntoIter<PlannedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
