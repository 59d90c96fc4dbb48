//! Row transformer: applies a column mapping to a raw row and coerces each
//! value to its field's declared type.
//!
//! Coercion never fails the row. A value that cannot be coerced is left out
//! of the output and its message is kept so the validator can report every
//! problem of a row at once.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};

use repclub_model::{
    ColumnMapping, CsvRow, FieldDefinition, FieldType, FieldValue, ModuleConfig, TransformedRow,
};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];
const TRUE_WORDS: &[&str] = &["yes", "y", "true", "t", "1"];
const FALSE_WORDS: &[&str] = &["no", "n", "false", "f", "0"];

/// Output of [`transform_row`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutcome {
    pub data: TransformedRow,
    /// Coercion failures keyed by field name.
    pub errors: BTreeMap<String, String>,
}

/// Re-key `row` by target field, dropping values that fail coercion.
pub fn transform(row: &CsvRow, mapping: &ColumnMapping, config: &ModuleConfig) -> TransformedRow {
    transform_row(row, mapping, config).data
}

/// Re-key `row` by target field and keep the coercion messages.
///
/// Unmapped fields and empty cells are absent from the output; whether that
/// matters is the validator's call.
pub fn transform_row(row: &CsvRow, mapping: &ColumnMapping, config: &ModuleConfig) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();
    for (source, target) in mapping.mapped() {
        let Some(field) = config.field(target) else {
            continue;
        };
        let raw = row.get(source).unwrap_or_default();
        match coerce_value(raw, field) {
            Ok(Some(value)) => {
                outcome.data.insert(field.name.clone(), value);
            }
            Ok(None) => {}
            Err(message) => {
                outcome.errors.insert(field.name.clone(), message);
            }
        }
    }
    outcome
}

/// Coerce one raw cell. `Ok(None)` for blank cells.
pub fn coerce_value(raw: &str, field: &FieldDefinition) -> Result<Option<FieldValue>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let name = &field.name;
    let value = match field.field_type {
        FieldType::Text | FieldType::Phone => FieldValue::text(trimmed),
        FieldType::Email => {
            let email = trimmed.to_lowercase();
            if !is_valid_email(&email) {
                return Err(format!("{name} must be a valid email address"));
            }
            FieldValue::Text(email)
        }
        FieldType::Number => match parse_number(trimmed) {
            Some(number) => FieldValue::Number(number),
            None => return Err(format!("{name} must be a valid number")),
        },
        FieldType::Integer => match parse_integer(trimmed) {
            Some(number) => FieldValue::Integer(number),
            None => return Err(format!("{name} must be a whole number")),
        },
        FieldType::Date => match parse_date(trimmed) {
            Some(date) => FieldValue::Date(date),
            None => return Err(format!("{name} must be a valid date")),
        },
        FieldType::Boolean => match parse_bool(trimmed) {
            Some(flag) => FieldValue::Bool(flag),
            None => return Err(format!("{name} must be yes or no")),
        },
        FieldType::Select => match field
            .options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(trimmed))
        {
            Some(option) => FieldValue::text(option.as_str()),
            None => {
                return Err(format!(
                    "{name} must be one of: {}",
                    field.options.join(", ")
                ));
            }
        },
    };
    Ok(Some(value))
}

fn clean_numeric(raw: &str) -> String {
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest.trim_start()),
        None => ("", raw),
    };
    let rest = rest.trim_start_matches(['$', '€', '£']);
    format!("{sign}{}", rest.replace(',', ""))
}

fn parse_number(raw: &str) -> Option<f64> {
    clean_numeric(raw)
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned = clean_numeric(raw);
    if let Ok(number) = cleaned.parse::<i64>() {
        return Some(number);
    }
    let number = cleaned.parse::<f64>().ok()?;
    if number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Some(number as i64)
    } else {
        None
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

fn parse_bool(raw: &str) -> Option<bool> {
    let lowered = raw.to_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(field_type: FieldType) -> FieldDefinition {
        FieldDefinition::new("value", "Value", field_type)
    }

    #[test]
    fn numbers_accept_currency_and_thousands() {
        let number = field(FieldType::Number);
        assert_eq!(
            coerce_value(" $1,250.50 ", &number),
            Ok(Some(FieldValue::Number(1250.5)))
        );
        assert_eq!(coerce_value("-€3", &number), Ok(Some(FieldValue::Number(-3.0))));
        assert_eq!(
            coerce_value("abc", &number),
            Err("value must be a valid number".to_string())
        );
        assert!(coerce_value("NaN", &number).is_err());
    }

    #[test]
    fn integers_accept_whole_decimals() {
        let integer = field(FieldType::Integer);
        assert_eq!(coerce_value("12.0", &integer), Ok(Some(FieldValue::Integer(12))));
        assert_eq!(coerce_value("1,200", &integer), Ok(Some(FieldValue::Integer(1200))));
        assert_eq!(
            coerce_value("12.5", &integer),
            Err("value must be a whole number".to_string())
        );
    }

    #[test]
    fn dates_accept_common_formats() {
        let date = field(FieldType::Date);
        let expected = Ok(Some(FieldValue::Date(
            NaiveDate::from_ymd_opt(2024, 3, 9).expect("date"),
        )));
        for raw in [
            "2024-03-09",
            "03/09/2024",
            "09.03.2024",
            "2024/03/09",
            "2024-03-09T10:30:00Z",
        ] {
            assert_eq!(coerce_value(raw, &date), expected, "{raw}");
        }
        assert_eq!(
            coerce_value("2024-02-30", &date),
            Err("value must be a valid date".to_string())
        );
    }

    #[test]
    fn booleans_and_selects() {
        assert_eq!(
            coerce_value("Yes", &field(FieldType::Boolean)),
            Ok(Some(FieldValue::Bool(true)))
        );
        assert_eq!(
            coerce_value("0", &field(FieldType::Boolean)),
            Ok(Some(FieldValue::Bool(false)))
        );
        let plan = field(FieldType::Select).with_options(&["basic", "premium"]);
        assert_eq!(
            coerce_value("PREMIUM", &plan),
            Ok(Some(FieldValue::text("premium")))
        );
        assert_eq!(
            coerce_value("gold", &plan),
            Err("value must be one of: basic, premium".to_string())
        );
    }

    #[test]
    fn emails_are_lowercased_and_checked() {
        let email = field(FieldType::Email);
        assert_eq!(
            coerce_value(" Jane@Example.COM ", &email),
            Ok(Some(FieldValue::text("jane@example.com")))
        );
        for bad in ["jane", "jane@", "@example.com", "jane@example", "ja ne@example.com"] {
            assert!(coerce_value(bad, &email).is_err(), "{bad}");
        }
    }

    #[test]
    fn blank_cells_are_absent() {
        assert_eq!(coerce_value("   ", &field(FieldType::Integer)), Ok(None));
    }
}
