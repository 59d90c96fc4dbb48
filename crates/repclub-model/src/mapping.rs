use serde::{Deserialize, Serialize};

/// Per-column statistics gathered from parsed rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnHint {
    pub is_numeric: bool,
    pub unique_ratio: f64,
    pub null_ratio: f64,
}

/// A single source column assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub source_column: String,
    /// `None` means "do not import this column".
    pub target_field: Option<String>,
}

/// Assignment of every source header to a target field or to "ignore".
///
/// Entries follow header order. Keys come from the parsed headers only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    entries: Vec<MappingEntry>,
}

impl ColumnMapping {
    /// A mapping that ignores every header.
    pub fn unmapped(headers: &[String]) -> Self {
        Self {
            entries: headers
                .iter()
                .map(|header| MappingEntry {
                    source_column: header.clone(),
                    target_field: None,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.entries.iter().any(|entry| entry.source_column == column)
    }

    pub fn target(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.source_column == column)
            .and_then(|entry| entry.target_field.as_deref())
    }

    /// Set the target for a known column. Returns false if the column is not
    /// part of this mapping.
    pub fn set(&mut self, column: &str, target: Option<String>) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.source_column == column)
        {
            Some(entry) => {
                entry.target_field = target;
                true
            }
            None => false,
        }
    }

    /// Source column currently mapped to `field`, if any.
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.target_field.as_deref() == Some(field))
            .map(|entry| entry.source_column.as_str())
    }

    /// `(source, target)` pairs for mapped columns only.
    pub fn mapped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| {
            entry
                .target_field
                .as_deref()
                .map(|target| (entry.source_column.as_str(), target))
        })
    }

    pub fn mapped_count(&self) -> usize {
        self.mapped().count()
    }

    pub fn unmapped_columns(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.target_field.is_none())
            .map(|entry| entry.source_column.as_str())
            .collect()
    }
}

/// Advisory mapping suggestion from the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiFieldSuggestion {
    pub source_column: String,
    pub suggested_target: Option<String>,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec!["Email".to_string(), "First".to_string()]
    }

    #[test]
    fn set_only_accepts_known_columns() {
        let mut mapping = ColumnMapping::unmapped(&headers());
        assert!(mapping.set("Email", Some("email".to_string())));
        assert!(!mapping.set("Phone", Some("phone".to_string())));
        assert_eq!(mapping.target("Email"), Some("email"));
        assert_eq!(mapping.column_for("email"), Some("Email"));
        assert_eq!(mapping.unmapped_columns(), vec!["First"]);
        assert_eq!(mapping.mapped_count(), 1);
    }

    #[test]
    fn suggestion_uses_camel_case_json() {
        let suggestion: AiFieldSuggestion = serde_json::from_str(
            r#"{"sourceColumn":"Mail","suggestedTarget":"email","confidence":0.9}"#,
        )
        .unwrap();
        assert_eq!(suggestion.suggested_target.as_deref(), Some("email"));
    }
}
