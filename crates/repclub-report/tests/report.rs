use async_trait::async_trait;
use repclub_model::{
    AiFieldSuggestion, Assistant, AssistantError, CsvRow, FieldDefinition, FieldType,
    ImportResult, ImportValidationResult, InvalidRow, ModuleConfig, RowOutcome, TransformedRow,
    ValidRow,
};
use repclub_report::{
    ImportSummary, error_report_csv, summarize, template_csv, validation_report_csv, write_report,
};

fn members() -> ModuleConfig {
    ModuleConfig {
        module: "members".to_string(),
        display_name: "Members".to_string(),
        table_name: "members".to_string(),
        fields: vec![
            FieldDefinition::new("email", "Email", FieldType::Email)
                .required()
                .with_examples(&["jane@example.com", "sam@example.com"]),
            FieldDefinition::new("first_name", "First Name", FieldType::Text)
                .with_examples(&["Jane"]),
            FieldDefinition::new("notes", "Notes", FieldType::Text)
                .with_examples(&["Prefers mornings, weekdays", "Knee injury", "Unused"]),
        ],
        duplicate_keys: vec!["email".to_string()],
        duplicate_display_field: "email".to_string(),
        template_file_name: "members_template.csv".to_string(),
    }
}

fn finished_run() -> ImportResult {
    let mut result = ImportResult::default();
    result.record(0, RowOutcome::Imported);
    result.record(2, RowOutcome::Merged);
    result.record(
        4,
        RowOutcome::Failed("constraint violation on members: duplicate value for email".to_string()),
    );
    result.record(5, RowOutcome::Failed("timeout, retry later".to_string()));
    result
}

#[test]
fn template_has_headers_and_two_example_rows() {
    let csv = template_csv(&members()).unwrap();
    insta::assert_snapshot!(csv, @r#"
    email,first_name,notes
    jane@example.com,Jane,"Prefers mornings, weekdays"
    sam@example.com,,Knee injury
    "#);
}

#[test]
fn template_without_examples_is_header_only() {
    let mut config = members();
    for field in &mut config.fields {
        field.examples.clear();
    }
    assert_eq!(template_csv(&config).unwrap(), "email,first_name,notes\n");
}

#[test]
fn error_report_uses_one_based_rows() {
    let csv = error_report_csv(&finished_run()).unwrap();
    insta::assert_snapshot!(csv, @r#"
    Row,Error
    5,constraint violation on members: duplicate value for email
    6,"timeout, retry later"
    "#);
}

#[test]
fn validation_report_lists_every_error() {
    let validation = ImportValidationResult {
        is_valid: false,
        valid_rows: Vec::new(),
        invalid_rows: vec![
            InvalidRow {
                row_index: 1,
                errors: vec![
                    "email is required".to_string(),
                    "plan must be one of: basic, premium".to_string(),
                ],
            },
            InvalidRow {
                row_index: 3,
                errors: vec!["visits must be a whole number".to_string()],
            },
        ],
        duplicates: Vec::new(),
    };
    let csv = validation_report_csv(&validation).unwrap();
    insta::assert_snapshot!(csv, @r#"
    Row,Error
    2,email is required
    2,"plan must be one of: basic, premium"
    4,visits must be a whole number
    "#);
}

#[test]
fn summary_combines_validation_and_execution() {
    let validation = ImportValidationResult {
        is_valid: false,
        valid_rows: (0..5)
            .map(|row_index| ValidRow {
                row_index,
                data: TransformedRow::new(),
            })
            .collect(),
        invalid_rows: vec![InvalidRow {
            row_index: 5,
            errors: vec!["email is required".to_string()],
        }],
        duplicates: Vec::new(),
    };
    let summary = ImportSummary::new(&members(), &validation, &finished_run(), &[7]);

    assert_eq!(summary.total_rows, 6);
    assert_eq!(summary.processed(), 4);
    assert_eq!(
        summary.headline(),
        "Members: 1 imported, 1 merged, 0 skipped, 2 failed"
    );
    assert_eq!(
        summary.warnings(),
        vec![
            "1 row(s) failed validation and were not imported".to_string(),
            "1 duplicate(s) had no decision and were skipped".to_string(),
        ]
    );
}

#[test]
fn summary_serializes_without_missing_ai_text() {
    let mut result = ImportResult::default();
    result.record(4, RowOutcome::Failed("timeout".to_string()));
    let summary = ImportSummary::new(
        &members(),
        &ImportValidationResult::default(),
        &result,
        &[],
    );
    assert!(!summary.success);
    insta::assert_json_snapshot!(summary, @r#"
    {
      "module": "members",
      "display_name": "Members",
      "total_rows": 0,
      "invalid_rows": 0,
      "duplicates": 0,
      "auto_skipped": 0,
      "imported": 0,
      "merged": 0,
      "skipped": 0,
      "failed": 1,
      "success": false,
      "errors": [
        {
          "row_index": 4,
          "error": "timeout"
        }
      ]
    }
    "#);
}

#[test]
fn reports_are_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("errors.csv");
    let csv = error_report_csv(&finished_run()).unwrap();
    write_report(&path, &csv).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);

    let missing = dir.path().join("missing").join("errors.csv");
    assert!(write_report(&missing, &csv).is_err());
}

struct CannedAssistant {
    reply: Result<&'static str, ()>,
}

#[async_trait]
impl Assistant for CannedAssistant {
    async fn suggest_column_mapping(
        &self,
        _headers: &[String],
        _sample_rows: &[CsvRow],
        _config: &ModuleConfig,
    ) -> Result<Vec<AiFieldSuggestion>, AssistantError> {
        Ok(Vec::new())
    }

    async fn summarize(
        &self,
        _result: &ImportResult,
        _config: &ModuleConfig,
    ) -> Result<String, AssistantError> {
        self.reply
            .map(str::to_string)
            .map_err(|()| AssistantError::Status { status: 503 })
    }
}

#[tokio::test]
async fn assistant_summary_is_best_effort() {
    let result = finished_run();
    let config = members();

    let ok = CannedAssistant {
        reply: Ok("  Two rows failed; fix the emails and re-import.\n"),
    };
    assert_eq!(
        summarize(&ok, &result, &config).await.as_deref(),
        Some("Two rows failed; fix the emails and re-import.")
    );

    let blank = CannedAssistant { reply: Ok("   ") };
    assert_eq!(summarize(&blank, &result, &config).await, None);

    let down = CannedAssistant { reply: Err(()) };
    assert_eq!(summarize(&down, &result, &config).await, None);
}
