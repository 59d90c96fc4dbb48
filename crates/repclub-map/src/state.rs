//! Mapping session state for the mapping step of an import.
//!
//! Holds the current [`ColumnMapping`] together with where each entry came
//! from, so assistant suggestions and re-runs of the auto-mapper never touch
//! a column the user has edited.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use repclub_model::{
    AiFieldSuggestion, Assistant, AssistantError, ColumnHint, ColumnMapping, CsvRow,
    ModuleConfig,
};

use crate::engine::MappingEngine;
use crate::error::MappingError;
use crate::score::AI_CONFIDENCE_MIN;

/// Where a column's current mapping entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSource {
    Auto,
    Assistant,
    Manual,
    Unmapped,
}

#[derive(Debug, Clone)]
pub struct MappingState {
    config: Arc<ModuleConfig>,
    headers: Vec<String>,
    column_hints: BTreeMap<String, ColumnHint>,
    mapping: ColumnMapping,
    manual: BTreeSet<String>,
    from_assistant: BTreeSet<String>,
    suggestions: Vec<AiFieldSuggestion>,
}

impl MappingState {
    /// Start a session with the auto-mapper's result.
    pub fn new(
        config: Arc<ModuleConfig>,
        headers: Vec<String>,
        column_hints: BTreeMap<String, ColumnHint>,
    ) -> Self {
        let mapping = MappingEngine::new(&config, &column_hints)
            .suggest(&headers)
            .to_mapping(&headers);
        info!(
            module = %config.module,
            columns = headers.len(),
            mapped = mapping.mapped_count(),
            "auto-mapped columns"
        );
        Self {
            config,
            headers,
            column_hints,
            mapping,
            manual: BTreeSet::new(),
            from_assistant: BTreeSet::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn config(&self) -> &Arc<ModuleConfig> {
        &self.config
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_hints(&self) -> &BTreeMap<String, ColumnHint> {
        &self.column_hints
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn into_mapping(self) -> ColumnMapping {
        self.mapping
    }

    /// Suggestions received from the assistant, applied or not.
    pub fn suggestions(&self) -> &[AiFieldSuggestion] {
        &self.suggestions
    }

    pub fn is_manual(&self, column: &str) -> bool {
        self.manual.contains(column)
    }

    pub fn source(&self, column: &str) -> MappingSource {
        if self.manual.contains(column) {
            MappingSource::Manual
        } else if self.mapping.target(column).is_none() {
            MappingSource::Unmapped
        } else if self.from_assistant.contains(column) {
            MappingSource::Assistant
        } else {
            MappingSource::Auto
        }
    }

    /// Record a user edit. `None` means "do not import this column" and is
    /// as binding as a field assignment.
    ///
    /// A field held by an automatic or assistant mapping moves to `column`,
    /// leaving the previous column unmapped. A field another manual edit
    /// holds is refused.
    pub fn set_manual(&mut self, column: &str, target: Option<&str>) -> Result<(), MappingError> {
        if !self.mapping.contains_column(column) {
            return Err(MappingError::ColumnNotFound(column.to_string()));
        }
        if let Some(field) = target {
            if self.config.field(field).is_none() {
                return Err(MappingError::FieldNotFound {
                    module: self.config.module.clone(),
                    field: field.to_string(),
                });
            }
            if let Some(other) = self.mapping.column_for(field)
                && other != column
            {
                let other = other.to_string();
                if self.manual.contains(&other) {
                    return Err(MappingError::FieldAlreadyMapped {
                        field: field.to_string(),
                        column: other,
                    });
                }
                debug!(column = %other, field, "unmapped in favour of manual edit");
                self.mapping.set(&other, None);
                self.from_assistant.remove(&other);
            }
        }
        self.mapping.set(column, target.map(str::to_string));
        self.manual.insert(column.to_string());
        self.from_assistant.remove(column);
        debug!(column, target = target.unwrap_or("-"), "manual mapping");
        Ok(())
    }

    /// Apply assistant suggestions to columns that are still unmapped and
    /// were never edited by hand. Returns the columns that changed.
    ///
    /// A suggestion is used only when its confidence is at least
    /// [`AI_CONFIDENCE_MIN`] and its target is a declared field that no other
    /// column maps to. Higher confidence wins when two suggestions want the
    /// same field.
    pub fn apply_ai_suggestions(&mut self, suggestions: Vec<AiFieldSuggestion>) -> Vec<String> {
        let mut ranked: Vec<&AiFieldSuggestion> = suggestions.iter().collect();
        ranked.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut applied = Vec::new();
        for suggestion in ranked {
            let column = suggestion.source_column.as_str();
            let Some(target) = suggestion.suggested_target.as_deref() else {
                continue;
            };
            if suggestion.confidence < AI_CONFIDENCE_MIN
                || !self.mapping.contains_column(column)
                || self.manual.contains(column)
                || self.mapping.target(column).is_some()
                || self.config.field(target).is_none()
                || self.mapping.column_for(target).is_some()
            {
                continue;
            }
            self.mapping.set(column, Some(target.to_string()));
            self.from_assistant.insert(column.to_string());
            debug!(
                column,
                target,
                confidence = suggestion.confidence,
                "applied assistant suggestion"
            );
            applied.push(column.to_string());
        }
        self.suggestions = suggestions;
        applied
    }

    /// Ask the assistant for suggestions and apply them.
    ///
    /// On failure the mapping is left as it was and the error is returned so
    /// the caller can tell the user the mapping is deterministic only.
    pub async fn refine_with_assistant(
        &mut self,
        assistant: &dyn Assistant,
        sample_rows: &[CsvRow],
    ) -> Result<Vec<String>, AssistantError> {
        if !assistant.is_enabled() {
            return Ok(Vec::new());
        }
        match assistant
            .suggest_column_mapping(&self.headers, sample_rows, &self.config)
            .await
        {
            Ok(suggestions) => {
                let applied = self.apply_ai_suggestions(suggestions);
                info!(applied = applied.len(), "assistant mapping suggestions");
                Ok(applied)
            }
            Err(error) => {
                warn!(%error, "assistant mapping failed; keeping deterministic mapping");
                Err(error)
            }
        }
    }

    /// Recompute every non-manual entry with the auto-mapper.
    pub fn rerun_auto_map(&mut self) {
        let used_fields: BTreeSet<String> = self
            .manual
            .iter()
            .filter_map(|column| self.mapping.target(column))
            .map(str::to_string)
            .collect();
        let result = MappingEngine::new(&self.config, &self.column_hints).suggest_excluding(
            &self.headers,
            &self.manual,
            &used_fields,
        );
        for header in &self.headers {
            if !self.manual.contains(header) {
                self.mapping.set(header, None);
            }
        }
        for matched in result.matches {
            self.mapping
                .set(&matched.source_column, Some(matched.target_field));
        }
        self.from_assistant.clear();
    }

    /// Required fields no column maps to, in declaration order.
    pub fn missing_required(&self) -> Vec<&str> {
        self.config
            .required_fields()
            .filter(|field| self.mapping.column_for(&field.name).is_none())
            .map(|field| field.name.as_str())
            .collect()
    }

    pub fn ensure_complete(&self) -> Result<(), MappingError> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MappingError::MissingRequired {
                fields: missing.into_iter().map(str::to_string).collect(),
            })
        }
    }

    pub fn summary(&self) -> MappingSummary {
        let required_total = self.config.required_fields().count();
        MappingSummary {
            total_columns: self.headers.len(),
            mapped: self.mapping.mapped_count(),
            manual: self.manual.len(),
            from_assistant: self.from_assistant.len(),
            required_total,
            required_mapped: required_total - self.missing_required().len(),
        }
    }
}

/// Summary of mapping counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingSummary {
    pub total_columns: usize,
    pub mapped: usize,
    /// Columns edited by hand, including explicit "ignore".
    pub manual: usize,
    pub from_assistant: usize,
    pub required_total: usize,
    pub required_mapped: usize,
}
