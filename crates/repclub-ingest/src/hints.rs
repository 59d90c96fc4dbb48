use std::collections::{BTreeMap, BTreeSet};

use repclub_model::{ColumnHint, ParsedCsvData};

fn looks_numeric(value: &str) -> bool {
    let cleaned: String = value
        .trim_start_matches(['$', '€', '£'])
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    cleaned.parse::<f64>().is_ok()
}

/// Per-column statistics over every parsed row, keyed by header.
pub fn build_column_hints(data: &ParsedCsvData) -> BTreeMap<String, ColumnHint> {
    let mut hints = BTreeMap::new();
    let row_count = data.rows.len();
    for (col_idx, header) in data.headers.iter().enumerate() {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        let mut uniques = BTreeSet::new();
        for row in &data.rows {
            let trimmed = row.values()[col_idx].trim();
            if trimmed.is_empty() {
                continue;
            }
            non_null += 1;
            uniques.insert(trimmed);
            if looks_numeric(trimmed) {
                numeric += 1;
            }
        }
        let null_ratio = if row_count == 0 {
            1.0
        } else {
            (row_count.saturating_sub(non_null)) as f64 / row_count as f64
        };
        let unique_ratio = if non_null == 0 {
            0.0
        } else {
            uniques.len() as f64 / non_null as f64
        };
        let is_numeric = non_null > 0 && numeric == non_null;
        hints.insert(
            header.clone(),
            ColumnHint {
                is_numeric,
                unique_ratio,
                null_ratio,
            },
        );
    }
    hints
}
