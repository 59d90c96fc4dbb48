//! Header-to-field similarity scoring.

use rapidfuzz::distance::jaro_winkler;

use repclub_model::{ColumnHint, FieldDefinition};

use crate::utils::normalize_name;

/// Minimum score for the deterministic pass to accept a match.
pub const ACCEPT_THRESHOLD: f32 = 0.85;

/// Minimum confidence for an assistant suggestion to be applied.
pub const AI_CONFIDENCE_MIN: f32 = 0.7;

/// Multiplier applied when column data disagrees with a numeric field.
pub const TYPE_MISMATCH_PENALTY: f32 = 0.85;

fn similarity(left: &str, right: &str) -> f32 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left == right {
        return 1.0;
    }
    jaro_winkler::similarity(left.chars(), right.chars()) as f32
}

/// Score a source header against one field, in `[0, 1]`.
///
/// An exact normalized match on the field name or label scores 1.0, anything
/// else is the better Jaro-Winkler similarity of the two. When a hint is
/// available and the column holds non-numeric data for a numeric field, the
/// score is scaled by [`TYPE_MISMATCH_PENALTY`].
pub fn score_field(header: &str, field: &FieldDefinition, hint: Option<&ColumnHint>) -> f32 {
    let column = normalize_name(header);
    let by_name = similarity(&column, &normalize_name(&field.name));
    let by_label = similarity(&column, &normalize_name(&field.label));
    let mut score = by_name.max(by_label);

    if let Some(hint) = hint
        && field.field_type.is_numeric()
        && hint.null_ratio < 1.0
        && !hint.is_numeric
    {
        score *= TYPE_MISMATCH_PENALTY;
    }
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repclub_model::FieldType;

    #[test]
    fn exact_label_match_scores_one() {
        let field = FieldDefinition::new("first_name", "First Name", FieldType::Text);
        assert_eq!(score_field("FIRST NAME", &field, None), 1.0);
        assert_eq!(score_field("first_name", &field, None), 1.0);
    }

    #[test]
    fn abbreviations_clear_threshold() {
        let first = FieldDefinition::new("first_name", "First Name", FieldType::Text);
        let last = FieldDefinition::new("last_name", "Last Name", FieldType::Text);
        assert!(score_field("First", &first, None) >= ACCEPT_THRESHOLD);
        assert!(score_field("Last", &last, None) >= ACCEPT_THRESHOLD);
        assert!(score_field("Last", &first, None) < ACCEPT_THRESHOLD);
    }

    #[test]
    fn text_data_in_numeric_field_is_penalized() {
        let field = FieldDefinition::new("price", "Price", FieldType::Number);
        let text = ColumnHint {
            is_numeric: false,
            unique_ratio: 1.0,
            null_ratio: 0.0,
        };
        let numeric = ColumnHint {
            is_numeric: true,
            ..text.clone()
        };
        assert_eq!(score_field("Price", &field, Some(&numeric)), 1.0);
        assert!((score_field("Price", &field, Some(&text)) - TYPE_MISMATCH_PENALTY).abs() < 1e-6);
    }

    #[test]
    fn empty_header_never_matches() {
        let field = FieldDefinition::new("email", "Email", FieldType::Email);
        assert_eq!(score_field("  ", &field, None), 0.0);
    }
}
