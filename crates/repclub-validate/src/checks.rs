use repclub_model::{FieldValue, ModuleConfig};

use crate::transform::TransformOutcome;

/// Field-level errors for one transformed row, in field declaration order.
///
/// A field contributes at most one message: its coercion error, else a
/// missing-required error, else a range error.
pub fn check_row(outcome: &TransformOutcome, config: &ModuleConfig) -> Vec<String> {
    let mut errors = Vec::new();
    for field in &config.fields {
        if let Some(message) = outcome.errors.get(&field.name) {
            errors.push(message.clone());
            continue;
        }
        match outcome.data.get(&field.name) {
            None => {
                if field.required {
                    errors.push(format!("{} is required", field.name));
                }
            }
            Some(value) if value.is_empty() => {
                if field.required {
                    errors.push(format!("{} is required", field.name));
                }
            }
            Some(value) => {
                if let Some(message) = check_range(&field.name, value, field.min, field.max) {
                    errors.push(message);
                }
            }
        }
    }
    errors
}

fn check_range(name: &str, value: &FieldValue, min: Option<f64>, max: Option<f64>) -> Option<String> {
    let number = value.as_f64()?;
    if let Some(min) = min
        && number < min
    {
        return Some(format!("{name} must be at least {min}"));
    }
    if let Some(max) = max
        && number > max
    {
        return Some(format!("{name} must be at most {max}"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use repclub_model::{FieldDefinition, FieldType};

    fn config() -> ModuleConfig {
        ModuleConfig {
            module: "classes".to_string(),
            display_name: "Classes".to_string(),
            table_name: "classes".to_string(),
            fields: vec![
                FieldDefinition::new("name", "Name", FieldType::Text).required(),
                FieldDefinition::new("duration", "Duration", FieldType::Integer)
                    .required()
                    .with_range(Some(1.0), Some(480.0)),
                FieldDefinition::new("price", "Price", FieldType::Number)
                    .with_range(Some(0.0), None),
            ],
            duplicate_keys: Vec::new(),
            duplicate_display_field: "name".to_string(),
            template_file_name: "classes.csv".to_string(),
        }
    }

    #[test]
    fn collects_every_error_in_field_order() {
        let mut outcome = TransformOutcome::default();
        outcome
            .errors
            .insert("duration".to_string(), "duration must be a whole number".to_string());
        outcome
            .data
            .insert("price".to_string(), FieldValue::Number(-2.5));
        assert_eq!(
            check_row(&outcome, &config()),
            vec![
                "name is required".to_string(),
                "duration must be a whole number".to_string(),
                "price must be at least 0".to_string(),
            ]
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut outcome = TransformOutcome::default();
        outcome.data.insert("name".to_string(), FieldValue::text("Spin"));
        outcome
            .data
            .insert("duration".to_string(), FieldValue::Integer(480));
        assert!(check_row(&outcome, &config()).is_empty());

        outcome
            .data
            .insert("duration".to_string(), FieldValue::Integer(481));
        assert_eq!(
            check_row(&outcome, &config()),
            vec!["duration must be at most 480".to_string()]
        );
    }
}
