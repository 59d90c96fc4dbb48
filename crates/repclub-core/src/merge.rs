//! Merge rule for updating an existing record from an import row.
//!
//! A value is empty when it is null or whitespace-only text. Zero and `false`
//! are real values and do overwrite.

use repclub_model::{ExternalRecord, FieldValue, TransformedRow};

/// The existing record's fields, overwritten by every non-empty incoming
/// value.
pub fn merge_record(existing: &ExternalRecord, incoming: &TransformedRow) -> TransformedRow {
    let mut merged = existing.fields.clone();
    merged.extend(merge_changes(existing, incoming));
    merged
}

/// Only the incoming fields that would change the existing record. This is
/// what gets sent as the partial update.
pub fn merge_changes(existing: &ExternalRecord, incoming: &TransformedRow) -> TransformedRow {
    incoming
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .filter(|(field, value)| {
            !existing
                .get(field)
                .is_some_and(|current| same_value(current, value))
        })
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

/// Dates and text share a JSON shape, so a stored date may come back as
/// either variant.
fn same_value(current: &FieldValue, incoming: &FieldValue) -> bool {
    match (current, incoming) {
        (FieldValue::Date(_), FieldValue::Text(_)) | (FieldValue::Text(_), FieldValue::Date(_)) => {
            current.to_string() == incoming.to_string()
        }
        _ => current == incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repclub_model::RecordId;

    fn existing() -> ExternalRecord {
        let mut fields = TransformedRow::new();
        fields.insert("email".to_string(), FieldValue::text("a@x.com"));
        fields.insert("first_name".to_string(), FieldValue::text("Jane"));
        fields.insert("phone".to_string(), FieldValue::text("555-0100"));
        fields.insert("visits".to_string(), FieldValue::Integer(12));
        ExternalRecord {
            id: RecordId::new("m-1"),
            fields,
        }
    }

    #[test]
    fn empty_values_never_overwrite() {
        let mut incoming = TransformedRow::new();
        incoming.insert("phone".to_string(), FieldValue::text("  "));
        incoming.insert("first_name".to_string(), FieldValue::Null);
        incoming.insert("last_name".to_string(), FieldValue::text("Doe"));

        let merged = merge_record(&existing(), &incoming);
        assert_eq!(merged.get("phone"), Some(&FieldValue::text("555-0100")));
        assert_eq!(merged.get("first_name"), Some(&FieldValue::text("Jane")));
        assert_eq!(merged.get("last_name"), Some(&FieldValue::text("Doe")));
    }

    #[test]
    fn zero_overwrites() {
        let mut incoming = TransformedRow::new();
        incoming.insert("visits".to_string(), FieldValue::Integer(0));
        let changes = merge_changes(&existing(), &incoming);
        assert_eq!(changes.get("visits"), Some(&FieldValue::Integer(0)));
    }

    #[test]
    fn unchanged_values_are_not_sent() {
        let mut incoming = TransformedRow::new();
        incoming.insert("email".to_string(), FieldValue::text("a@x.com"));
        incoming.insert("first_name".to_string(), FieldValue::text("Janet"));
        let changes = merge_changes(&existing(), &incoming);
        assert_eq!(changes.len(), 1);
        assert!(changes.contains_key("first_name"));
    }

    #[test]
    fn reloaded_date_text_is_unchanged() {
        let mut record = existing();
        record
            .fields
            .insert("notes".to_string(), FieldValue::text("2024-01-15"));
        let reloaded: FieldValue = serde_json::from_str(r#""2024-01-15""#).unwrap();
        assert!(matches!(reloaded, FieldValue::Date(_)));
        let mut incoming = TransformedRow::new();
        incoming.insert("notes".to_string(), reloaded);
        assert!(merge_changes(&record, &incoming).is_empty());

        incoming.insert("notes".to_string(), FieldValue::text("2024-01-16"));
        assert_eq!(merge_changes(&record, &incoming).len(), 1);
    }
}
