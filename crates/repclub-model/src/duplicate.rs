use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value::{FieldValue, TransformedRow};

/// Identity of a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record already present in the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub id: RecordId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl ExternalRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Human-readable label for review screens, falling back to the id.
    pub fn display_value(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => self.id.to_string(),
        }
    }
}

/// Decision for a flagged duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Update the existing record with the row's non-empty values.
    Merge,
    /// Insert the row as a new record anyway.
    Create,
    /// Leave the existing record alone and do not write the row.
    Skip,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Merge => "merge",
            Resolution::Create => "create",
            Resolution::Skip => "skip",
        }
    }

    pub const ALL: &'static [&'static str] = &["merge", "create", "skip"];
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "merge" | "update" => Ok(Resolution::Merge),
            "create" | "create_new" | "new" => Ok(Resolution::Create),
            "skip" => Ok(Resolution::Skip),
            _ => Err(format!(
                "Unknown resolution '{s}'. Must be one of: {}",
                Resolution::ALL.join(", ")
            )),
        }
    }
}

/// An incoming row that collides with an existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    /// Index of the source row (0-based, file order).
    pub import_row_index: usize,
    pub import_data: TransformedRow,
    pub existing_record: ExternalRecord,
    /// Duplicate keys that were compared and found equal.
    pub matched_fields: Vec<String>,
    /// `None` until someone decides; finalized to `Skip` before execution.
    pub resolution: Option<Resolution>,
}

impl DuplicateRecord {
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}
