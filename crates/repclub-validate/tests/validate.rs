use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proptest::prelude::*;
use repclub_model::{
    ColumnMapping, CsvRow, Destination, DestinationError, ExternalRecord, FieldDefinition,
    FieldType, FieldValue, KeyFilter, ModuleConfig, RecordId, RowBucket, TenantContext,
    TransformedRow,
};
use repclub_validate::{ValidateError, transform, validate};

fn members() -> ModuleConfig {
    ModuleConfig {
        module: "members".to_string(),
        display_name: "Members".to_string(),
        table_name: "members".to_string(),
        fields: vec![
            FieldDefinition::new("email", "Email", FieldType::Email).required(),
            FieldDefinition::new("first_name", "First Name", FieldType::Text).required(),
            FieldDefinition::new("last_name", "Last Name", FieldType::Text),
            FieldDefinition::new("visits", "Visits", FieldType::Integer).with_range(Some(0.0), None),
        ],
        duplicate_keys: vec!["email".to_string()],
        duplicate_display_field: "email".to_string(),
        template_file_name: "members.csv".to_string(),
    }
}

fn rows(headers: &[&str], values: &[&[&str]]) -> Vec<CsvRow> {
    let headers: Arc<[String]> = headers.iter().map(|h| h.to_string()).collect();
    values
        .iter()
        .map(|row| {
            CsvRow::new(
                Arc::clone(&headers),
                row.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

fn mapping(pairs: &[(&str, Option<&str>)]) -> ColumnMapping {
    let headers: Vec<String> = pairs.iter().map(|(column, _)| column.to_string()).collect();
    let mut mapping = ColumnMapping::unmapped(&headers);
    for (column, target) in pairs {
        mapping.set(column, target.map(str::to_string));
    }
    mapping
}

fn standard_mapping() -> ColumnMapping {
    mapping(&[
        ("Email", Some("email")),
        ("First", Some("first_name")),
        ("Last", Some("last_name")),
    ])
}

fn record(id: &str, email: &str) -> ExternalRecord {
    let mut fields = TransformedRow::new();
    fields.insert("email".to_string(), FieldValue::text(email));
    fields.insert("first_name".to_string(), FieldValue::text("Existing"));
    ExternalRecord {
        id: RecordId::new(id),
        fields,
    }
}

/// Returns stored records whose fields match every filter, and remembers
/// each lookup it served.
#[derive(Default)]
struct StubDestination {
    records: Vec<ExternalRecord>,
    fail_on: Option<String>,
    lookups: Mutex<Vec<Vec<KeyFilter>>>,
}

#[async_trait]
impl Destination for StubDestination {
    async fn select(
        &self,
        _ctx: &TenantContext,
        _table: &str,
        filters: &[KeyFilter],
    ) -> Result<Vec<ExternalRecord>, DestinationError> {
        self.lookups.lock().unwrap().push(filters.to_vec());
        if let Some(bad) = &self.fail_on
            && filters.iter().any(|f| f.value.as_text() == Some(bad.as_str()))
        {
            return Err(DestinationError::Unavailable("timeout".to_string()));
        }
        Ok(self
            .records
            .iter()
            .filter(|record| {
                filters.iter().all(|filter| {
                    record
                        .get(&filter.field)
                        .is_some_and(|value| value.matches(&filter.value))
                })
            })
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        _ctx: &TenantContext,
        _table: &str,
        _record: &TransformedRow,
    ) -> Result<RecordId, DestinationError> {
        unreachable!("validation never writes")
    }

    async fn update(
        &self,
        _ctx: &TenantContext,
        _table: &str,
        _id: &RecordId,
        _partial: &TransformedRow,
    ) -> Result<(), DestinationError> {
        unreachable!("validation never writes")
    }
}

fn ctx() -> TenantContext {
    TenantContext::new("org-1")
}

#[tokio::test]
async fn new_email_is_valid() {
    let rows = rows(&["Email", "First", "Last"], &[&["a@x.com", "Jane", "Doe"]]);
    let destination = StubDestination::default();
    let result = validate(&rows, &standard_mapping(), &members(), &destination, &ctx())
        .await
        .expect("validate");
    assert!(result.is_valid);
    assert_eq!(result.valid_rows.len(), 1);
    assert!(result.duplicates.is_empty());
    let data = &result.valid_rows[0].data;
    assert_eq!(data.get("first_name"), Some(&FieldValue::text("Jane")));
}

#[tokio::test]
async fn existing_email_is_a_duplicate() {
    let rows = rows(&["Email", "First", "Last"], &[&["A@X.com", "Jane", "Doe"]]);
    let destination = StubDestination {
        records: vec![record("m-1", "a@x.com")],
        ..StubDestination::default()
    };
    let result = validate(&rows, &standard_mapping(), &members(), &destination, &ctx())
        .await
        .expect("validate");
    assert!(result.valid_rows.is_empty());
    assert_eq!(result.duplicates.len(), 1);
    let duplicate = &result.duplicates[0];
    assert_eq!(duplicate.import_row_index, 0);
    assert_eq!(duplicate.matched_fields, vec!["email".to_string()]);
    assert_eq!(duplicate.existing_record.id, RecordId::new("m-1"));
    assert!(duplicate.resolution.is_none());
}

#[tokio::test]
async fn missing_required_email_is_invalid_and_not_looked_up() {
    let rows = rows(&["Email", "First", "Last"], &[&["", "Jane", "Doe"]]);
    let destination = StubDestination::default();
    let result = validate(&rows, &standard_mapping(), &members(), &destination, &ctx())
        .await
        .expect("validate");
    assert!(!result.is_valid);
    assert_eq!(result.invalid_rows.len(), 1);
    assert_eq!(result.invalid_rows[0].errors, vec!["email is required".to_string()]);
    assert!(destination.lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn all_errors_of_a_row_are_reported() {
    let rows = rows(&["Email", "Visits"], &[&["not-an-email", "-3"]]);
    let mapping = mapping(&[("Email", Some("email")), ("Visits", Some("visits"))]);
    let result = validate(&rows, &mapping, &members(), &StubDestination::default(), &ctx())
        .await
        .expect("validate");
    assert_eq!(
        result.invalid_rows[0].errors,
        vec![
            "email must be a valid email address".to_string(),
            "first_name is required".to_string(),
            "visits must be at least 0".to_string(),
        ]
    );
}

#[tokio::test]
async fn modules_without_duplicate_keys_skip_lookup() {
    let mut config = members();
    config.duplicate_keys.clear();
    let rows = rows(&["Email", "First", "Last"], &[&["a@x.com", "Jane", "Doe"]]);
    let destination = StubDestination {
        records: vec![record("m-1", "a@x.com")],
        ..StubDestination::default()
    };
    let result = validate(&rows, &standard_mapping(), &config, &destination, &ctx())
        .await
        .expect("validate");
    assert_eq!(result.valid_rows.len(), 1);
    assert!(destination.lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn lookup_uses_only_present_keys() {
    let mut config = members();
    config.duplicate_keys = vec!["email".to_string(), "last_name".to_string()];
    let rows = rows(&["Email", "First", "Last"], &[&["a@x.com", "Jane", ""]]);
    let destination = StubDestination {
        records: vec![record("m-1", "a@x.com")],
        ..StubDestination::default()
    };
    let result = validate(&rows, &standard_mapping(), &config, &destination, &ctx())
        .await
        .expect("validate");
    assert_eq!(result.duplicates[0].matched_fields, vec!["email".to_string()]);
    let lookups = destination.lookups.lock().unwrap();
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].len(), 1);
}

#[tokio::test]
async fn failed_lookup_marks_only_that_row_invalid() {
    let rows = rows(
        &["Email", "First", "Last"],
        &[&["a@x.com", "Jane", "Doe"], &["b@x.com", "Marc", "Lee"]],
    );
    let destination = StubDestination {
        fail_on: Some("a@x.com".to_string()),
        ..StubDestination::default()
    };
    let result = validate(&rows, &standard_mapping(), &members(), &destination, &ctx())
        .await
        .expect("validate");
    assert_eq!(result.row_bucket(0), Some(RowBucket::Invalid));
    assert_eq!(result.row_bucket(1), Some(RowBucket::Valid));
    assert_eq!(
        result.invalid_rows[0].errors,
        vec!["duplicate check failed: destination unavailable: timeout".to_string()]
    );
}

#[tokio::test]
async fn inconsistent_mapping_is_rejected() {
    let rows = rows(&["Email"], &[&["a@x.com"]]);
    let bad_field = mapping(&[("Email", Some("mail"))]);
    let error = validate(&rows, &bad_field, &members(), &StubDestination::default(), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(error, ValidateError::UnknownField { .. }));

    let bad_column = mapping(&[("E-mail", Some("email"))]);
    let error = validate(&rows, &bad_column, &members(), &StubDestination::default(), &ctx())
        .await
        .unwrap_err();
    assert_eq!(
        error,
        ValidateError::UnknownColumn {
            column: "E-mail".to_string()
        }
    );
}

#[test]
fn unmapped_fields_are_absent() {
    let rows = rows(&["Email", "First", "Notes"], &[&[" A@x.com ", " Jane ", "hi"]]);
    let mapping = mapping(&[
        ("Email", Some("email")),
        ("First", Some("first_name")),
        ("Notes", None),
    ]);
    let data = transform(&rows[0], &mapping, &members());
    assert_eq!(data.len(), 2);
    assert_eq!(data.get("email"), Some(&FieldValue::text("a@x.com")));
    assert_eq!(data.get("first_name"), Some(&FieldValue::text("Jane")));
    assert!(!data.contains_key("last_name"));
}

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("a@x.com".to_string()),
        Just("b@x.com".to_string()),
        Just("broken".to_string()),
        "[a-z]{1,5}",
    ]
}

proptest! {
    #[test]
    fn every_row_lands_in_exactly_one_bucket(
        cells in prop::collection::vec((cell(), cell()), 0..12),
    ) {
        let values: Vec<Vec<String>> = cells
            .into_iter()
            .map(|(email, first)| vec![email, first, String::new()])
            .collect();
        let value_refs: Vec<Vec<&str>> = values
            .iter()
            .map(|row| row.iter().map(String::as_str).collect())
            .collect();
        let slices: Vec<&[&str]> = value_refs.iter().map(Vec::as_slice).collect();
        let rows = rows(&["Email", "First", "Last"], &slices);
        let destination = StubDestination {
            records: vec![record("m-1", "a@x.com")],
            ..StubDestination::default()
        };

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let result = runtime
            .block_on(validate(&rows, &standard_mapping(), &members(), &destination, &ctx()))
            .unwrap();

        prop_assert_eq!(result.total_rows(), rows.len());
        for idx in 0..rows.len() {
            let hits = usize::from(result.valid_rows.iter().any(|r| r.row_index == idx))
                + usize::from(result.invalid_rows.iter().any(|r| r.row_index == idx))
                + usize::from(result.duplicates.iter().any(|r| r.import_row_index == idx));
            prop_assert_eq!(hits, 1);
        }
        prop_assert_eq!(result.is_valid, result.invalid_rows.is_empty());
    }
}
