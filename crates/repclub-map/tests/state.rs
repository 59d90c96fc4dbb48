use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use repclub_map::{MappingError, MappingSource, MappingState, auto_map};
use repclub_model::{
    AiFieldSuggestion, Assistant, AssistantError, ColumnHint, CsvRow, FieldDefinition, FieldType,
    ImportResult, ModuleConfig,
};

fn members() -> Arc<ModuleConfig> {
    Arc::new(ModuleConfig {
        module: "members".to_string(),
        display_name: "Members".to_string(),
        table_name: "members".to_string(),
        fields: vec![
            FieldDefinition::new("email", "Email", FieldType::Email).required(),
            FieldDefinition::new("first_name", "First Name", FieldType::Text).required(),
            FieldDefinition::new("last_name", "Last Name", FieldType::Text),
            FieldDefinition::new("phone", "Phone", FieldType::Phone),
            FieldDefinition::new("visits", "Visit Count", FieldType::Integer),
        ],
        duplicate_keys: vec!["email".to_string()],
        duplicate_display_field: "email".to_string(),
        template_file_name: "members.csv".to_string(),
    })
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn suggestion(column: &str, target: &str, confidence: f32) -> AiFieldSuggestion {
    AiFieldSuggestion {
        source_column: column.to_string(),
        suggested_target: Some(target.to_string()),
        confidence,
    }
}

#[test]
fn maps_short_headers_to_fields() {
    let config = members();
    let mapping = auto_map(&headers(&["Email", "First", "Last"]), &config);
    assert_eq!(mapping.target("Email"), Some("email"));
    assert_eq!(mapping.target("First"), Some("first_name"));
    assert_eq!(mapping.target("Last"), Some("last_name"));
}

#[test]
fn unrelated_headers_stay_unmapped() {
    let config = members();
    let mapping = auto_map(&headers(&["Locker", "Shoe Size"]), &config);
    assert_eq!(mapping.mapped_count(), 0);
    assert_eq!(mapping.unmapped_columns(), vec!["Locker", "Shoe Size"]);
}

#[test]
fn column_hints_penalize_text_in_numeric_fields() {
    let mut hints = BTreeMap::new();
    let text = ColumnHint {
        is_numeric: false,
        unique_ratio: 1.0,
        null_ratio: 0.0,
    };
    hints.insert("Visit".to_string(), text);
    let state = MappingState::new(members(), headers(&["Visit"]), hints.clone());
    assert_eq!(state.mapping().target("Visit"), None);

    hints.get_mut("Visit").expect("hint").is_numeric = true;
    let state = MappingState::new(members(), headers(&["Visit"]), hints);
    assert_eq!(state.mapping().target("Visit"), Some("visits"));
}

#[test]
fn manual_edits_are_validated() {
    let mut state = MappingState::new(members(), headers(&["Email", "Mail"]), BTreeMap::new());
    assert_eq!(
        state.set_manual("Phone", Some("phone")),
        Err(MappingError::ColumnNotFound("Phone".to_string()))
    );
    assert!(matches!(
        state.set_manual("Mail", Some("locker")),
        Err(MappingError::FieldNotFound { .. })
    ));
    assert_eq!(state.source("Email"), MappingSource::Auto);
    state.set_manual("Mail", Some("email")).expect("take email from auto mapping");
    assert_eq!(state.source("Mail"), MappingSource::Manual);
    assert_eq!(state.source("Email"), MappingSource::Unmapped);
    assert_eq!(state.mapping().target("Email"), None);
    assert_eq!(state.mapping().column_for("email"), Some("Mail"));

    assert_eq!(
        state.set_manual("Email", Some("email")),
        Err(MappingError::FieldAlreadyMapped {
            field: "email".to_string(),
            column: "Mail".to_string(),
        })
    );
    state.set_manual("Mail", None).expect("ignore mail");
    state.set_manual("Email", Some("email")).expect("remap email");
    assert_eq!(state.mapping().column_for("email"), Some("Email"));
}

#[test]
fn ai_only_fills_unmapped_unedited_columns() {
    let mut state = MappingState::new(
        members(),
        headers(&["Email", "Given", "Surname", "Cell", "Notes"]),
        BTreeMap::new(),
    );
    state.set_manual("Notes", None).expect("ignore notes");

    let applied = state.apply_ai_suggestions(vec![
        suggestion("Email", "phone", 0.99),
        suggestion("Given", "first_name", 0.92),
        suggestion("Surname", "last_name", 0.5),
        suggestion("Cell", "phone", 0.8),
        suggestion("Notes", "last_name", 0.95),
        suggestion("Missing", "visits", 0.9),
    ]);

    assert_eq!(applied, vec!["Given".to_string(), "Cell".to_string()]);
    assert_eq!(state.mapping().target("Email"), Some("email"));
    assert_eq!(state.mapping().target("Given"), Some("first_name"));
    assert_eq!(state.mapping().target("Surname"), None);
    assert_eq!(state.mapping().target("Notes"), None);
    assert_eq!(state.source("Cell"), MappingSource::Assistant);
    assert_eq!(state.suggestions().len(), 6);

    state.set_manual("Surname", Some("phone")).expect("override assistant");
    assert_eq!(state.source("Cell"), MappingSource::Unmapped);
    assert_eq!(state.mapping().column_for("phone"), Some("Surname"));
}

#[test]
fn ai_never_reuses_a_mapped_field() {
    let mut state = MappingState::new(members(), headers(&["Email", "Contact"]), BTreeMap::new());
    let applied = state.apply_ai_suggestions(vec![suggestion("Contact", "email", 0.9)]);
    assert!(applied.is_empty());
    assert_eq!(state.mapping().target("Contact"), None);
}

#[test]
fn rerun_keeps_manual_entries() {
    let mut state = MappingState::new(members(), headers(&["Email", "First", "Alt"]), BTreeMap::new());
    state.set_manual("Alt", Some("last_name")).expect("manual");
    state.apply_ai_suggestions(vec![]);
    state.set_manual("First", None).expect("ignore first");
    state.rerun_auto_map();
    assert_eq!(state.mapping().target("Alt"), Some("last_name"));
    assert_eq!(state.mapping().target("First"), None);
    assert_eq!(state.mapping().target("Email"), Some("email"));
}

#[test]
fn missing_required_blocks_completion() {
    let mut state = MappingState::new(members(), headers(&["Email", "Nick"]), BTreeMap::new());
    assert_eq!(state.missing_required(), vec!["first_name"]);
    let error = state.ensure_complete().unwrap_err();
    assert_eq!(error.to_string(), "required fields are not mapped: first_name");

    state.set_manual("Nick", Some("first_name")).expect("manual");
    assert!(state.ensure_complete().is_ok());
    let summary = state.summary();
    assert_eq!(summary.required_mapped, 2);
    assert_eq!(summary.manual, 1);
}

struct FixedAssistant {
    suggestions: Vec<AiFieldSuggestion>,
}

#[async_trait]
impl Assistant for FixedAssistant {
    async fn suggest_column_mapping(
        &self,
        _headers: &[String],
        _sample_rows: &[CsvRow],
        _config: &ModuleConfig,
    ) -> Result<Vec<AiFieldSuggestion>, AssistantError> {
        Ok(self.suggestions.clone())
    }

    async fn summarize(
        &self,
        _result: &ImportResult,
        _config: &ModuleConfig,
    ) -> Result<String, AssistantError> {
        Ok(String::new())
    }
}

struct BrokenAssistant;

#[async_trait]
impl Assistant for BrokenAssistant {
    async fn suggest_column_mapping(
        &self,
        _headers: &[String],
        _sample_rows: &[CsvRow],
        _config: &ModuleConfig,
    ) -> Result<Vec<AiFieldSuggestion>, AssistantError> {
        Err(AssistantError::Status { status: 503 })
    }

    async fn summarize(
        &self,
        _result: &ImportResult,
        _config: &ModuleConfig,
    ) -> Result<String, AssistantError> {
        Err(AssistantError::Status { status: 503 })
    }
}

#[tokio::test]
async fn assistant_refines_mapping() {
    let mut state = MappingState::new(members(), headers(&["Email", "Given"]), BTreeMap::new());
    let assistant = FixedAssistant {
        suggestions: vec![suggestion("Given", "first_name", 0.9)],
    };
    let applied = state
        .refine_with_assistant(&assistant, &[])
        .await
        .expect("suggestions");
    assert_eq!(applied, vec!["Given".to_string()]);
    assert!(state.ensure_complete().is_ok());
}

#[tokio::test]
async fn assistant_failure_keeps_deterministic_mapping() {
    let mut state = MappingState::new(members(), headers(&["Email", "Given"]), BTreeMap::new());
    let before = state.mapping().clone();
    let error = state
        .refine_with_assistant(&BrokenAssistant, &[])
        .await
        .unwrap_err();
    assert!(matches!(error, AssistantError::Status { status: 503 }));
    assert_eq!(state.mapping(), &before);
}

proptest! {
    #[test]
    fn auto_map_is_idempotent(names in prop::collection::vec("[A-Za-z _]{1,12}", 0..8)) {
        let config = members();
        let columns: Vec<String> = names;
        let first = auto_map(&columns, &config);
        let second = auto_map(&columns, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn ai_never_changes_manual_entries(
        confidence in 0.0f32..=1.0,
        target in prop::sample::select(vec!["email", "first_name", "last_name", "phone", "visits"]),
        manual_target in prop::option::of(prop::sample::select(vec!["last_name", "phone"])),
    ) {
        let mut state = MappingState::new(members(), headers(&["Email", "Column A"]), BTreeMap::new());
        state.set_manual("Column A", manual_target).unwrap();
        state.apply_ai_suggestions(vec![suggestion("Column A", target, confidence)]);
        prop_assert_eq!(state.mapping().target("Column A"), manual_target);
    }
}
