use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A coerced cell value in the target schema.
///
/// Serialized untagged so records read like plain JSON objects; dates are
/// written as `YYYY-MM-DD` strings.
///
/// JSON cannot keep `Date` and `Text` apart: any string shaped like
/// `YYYY-MM-DD` reads back as `Date`, including free text that happens to
/// look like one. [`FieldValue::matches`] and [`fmt::Display`] give the same
/// result for both variants, so duplicate checks and merges are unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Null and whitespace-only text are empty. Zero and `false` are values.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Canonical form used when comparing values for duplicate detection.
    ///
    /// Text is trimmed and lowercased, so `A@X.com` and `a@x.com` collide.
    pub fn match_key(&self) -> String {
        match self {
            FieldValue::Text(value) => value.trim().to_lowercase(),
            other => other.to_string(),
        }
    }

    pub fn matches(&self, other: &FieldValue) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => self.match_key() == other.match_key(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// A source row re-keyed by target field names.
///
/// Fields the mapping does not cover, or whose coercion failed, are absent.
pub type TransformedRow = BTreeMap<String, FieldValue>;
