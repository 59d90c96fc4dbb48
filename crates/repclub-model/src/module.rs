use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Declared storage type of an importable field.
///
/// Drives both coercion in the row transformer and the format checks the
/// validator runs against the raw cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Phone,
    Number,
    Integer,
    Date,
    Boolean,
    /// One of a fixed list of values (see [`FieldDefinition::options`]).
    Select,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
        }
    }

    /// Returns true for types whose cells are expected to hold numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Integer)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Ok(FieldType::Text),
            "email" => Ok(FieldType::Email),
            "phone" | "tel" => Ok(FieldType::Phone),
            "number" | "decimal" | "float" => Ok(FieldType::Number),
            "integer" | "int" => Ok(FieldType::Integer),
            "date" => Ok(FieldType::Date),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "select" | "enum" => Ok(FieldType::Select),
            _ => Err(format!("Unknown field type: {s}")),
        }
    }
}

/// One importable field of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub examples: Vec<String>,
    /// Inclusive lower bound for numeric fields.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric fields.
    #[serde(default)]
    pub max: Option<f64>,
    /// Allowed values for `select` fields, compared case-insensitively.
    #[serde(default)]
    pub options: Vec<String>,
}

impl FieldDefinition {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: false,
            field_type,
            examples: Vec::new(),
            min: None,
            max: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_examples(mut self, examples: &[&str]) -> Self {
        self.examples = examples.iter().map(|value| value.to_string()).collect();
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|value| value.to_string()).collect();
        self
    }
}

/// Static import descriptor for one entity type (members, leads, ...).
///
/// Immutable once loaded; every stage of an import session borrows the same
/// config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub module: String,
    pub display_name: String,
    /// Logical destination table.
    pub table_name: String,
    pub fields: Vec<FieldDefinition>,
    /// Fields whose combined equality marks an incoming row as a duplicate.
    #[serde(default)]
    pub duplicate_keys: Vec<String>,
    /// Field shown to a reviewer when deciding on a duplicate.
    pub duplicate_display_field: String,
    pub template_file_name: String,
}

impl ModuleConfig {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Position of a field in declaration order.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|field| field.required)
    }

    pub fn has_duplicate_detection(&self) -> bool {
        !self.duplicate_keys.is_empty()
    }

    /// Check internal consistency: unique field names, and duplicate keys and
    /// the display field referring to declared fields.
    pub fn check(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(ModelError::NoFields {
                module: self.module.clone(),
            });
        }
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ModelError::DuplicateField {
                    module: self.module.clone(),
                    field: field.name.clone(),
                });
            }
            if field.field_type == FieldType::Select && field.options.is_empty() {
                return Err(ModelError::EmptyOptions {
                    module: self.module.clone(),
                    field: field.name.clone(),
                });
            }
        }
        for key in &self.duplicate_keys {
            if !seen.contains(key.as_str()) {
                return Err(ModelError::UnknownDuplicateKey {
                    module: self.module.clone(),
                    key: key.clone(),
                });
            }
        }
        if !seen.contains(self.duplicate_display_field.as_str()) {
            return Err(ModelError::UnknownDisplayField {
                module: self.module.clone(),
                field: self.duplicate_display_field.clone(),
            });
        }
        Ok(())
    }
}
