//! Deterministic auto-mapping engine.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use repclub_model::{ColumnHint, ColumnMapping, ModuleConfig};

use crate::score::{ACCEPT_THRESHOLD, score_field};

/// One accepted header-to-field assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub source_column: String,
    pub target_field: String,
    pub score: f32,
}

/// Result of a mapping pass.
#[derive(Debug, Clone, Default)]
pub struct MappingResult {
    /// Accepted matches, best first.
    pub matches: Vec<ScoredMatch>,
    /// Headers left without a field, in header order.
    pub unmapped_columns: Vec<String>,
}

impl MappingResult {
    /// Fold the matches into a mapping over `headers`.
    pub fn to_mapping(&self, headers: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping::unmapped(headers);
        for matched in &self.matches {
            mapping.set(&matched.source_column, Some(matched.target_field.clone()));
        }
        mapping
    }
}

struct Candidate {
    column_idx: usize,
    field_idx: usize,
    score: f32,
}

/// Scores every header against every field of a module and assigns them
/// one-to-one.
///
/// Candidates at or above [`ACCEPT_THRESHOLD`] are taken greedily by
/// descending score. Equal scores go to the earlier declared field, then to
/// the earlier header, so the outcome never depends on iteration order.
pub struct MappingEngine<'a> {
    config: &'a ModuleConfig,
    column_hints: &'a BTreeMap<String, ColumnHint>,
    threshold: f32,
}

impl<'a> MappingEngine<'a> {
    pub fn new(config: &'a ModuleConfig, column_hints: &'a BTreeMap<String, ColumnHint>) -> Self {
        Self {
            config,
            column_hints,
            threshold: ACCEPT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn suggest(&self, headers: &[String]) -> MappingResult {
        self.suggest_excluding(headers, &BTreeSet::new(), &BTreeSet::new())
    }

    /// Like [`Self::suggest`], but never assigns the `locked_columns` or the
    /// `used_fields`. Used to re-run auto-mapping around manual edits.
    pub fn suggest_excluding(
        &self,
        headers: &[String],
        locked_columns: &BTreeSet<String>,
        used_fields: &BTreeSet<String>,
    ) -> MappingResult {
        let mut candidates = Vec::new();
        for (column_idx, header) in headers.iter().enumerate() {
            if locked_columns.contains(header) {
                continue;
            }
            let hint = self.column_hints.get(header);
            for (field_idx, field) in self.config.fields.iter().enumerate() {
                if used_fields.contains(&field.name) {
                    continue;
                }
                let score = score_field(header, field, hint);
                if score >= self.threshold {
                    candidates.push(Candidate {
                        column_idx,
                        field_idx,
                        score,
                    });
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.field_idx.cmp(&b.field_idx))
                .then(a.column_idx.cmp(&b.column_idx))
        });

        let mut taken_columns = BTreeSet::new();
        let mut taken_fields = BTreeSet::new();
        let mut matches = Vec::new();
        for candidate in candidates {
            if taken_columns.contains(&candidate.column_idx)
                || taken_fields.contains(&candidate.field_idx)
            {
                continue;
            }
            taken_columns.insert(candidate.column_idx);
            taken_fields.insert(candidate.field_idx);
            let source_column = headers[candidate.column_idx].clone();
            let target_field = self.config.fields[candidate.field_idx].name.clone();
            debug!(
                column = %source_column,
                field = %target_field,
                score = candidate.score,
                "auto-mapped column"
            );
            matches.push(ScoredMatch {
                source_column,
                target_field,
                score: candidate.score,
            });
        }

        let unmapped_columns = headers
            .iter()
            .enumerate()
            .filter(|(idx, header)| !taken_columns.contains(idx) && !locked_columns.contains(*header))
            .map(|(_, header)| header.clone())
            .collect();

        MappingResult {
            matches,
            unmapped_columns,
        }
    }
}

/// Map headers to fields by name similarity alone.
pub fn auto_map(headers: &[String], config: &ModuleConfig) -> ColumnMapping {
    let hints = BTreeMap::new();
    MappingEngine::new(config, &hints)
        .suggest(headers)
        .to_mapping(headers)
}
