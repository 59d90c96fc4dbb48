//! Splits transformed rows into valid, invalid and duplicate buckets.

use tracing::{debug, info};

use repclub_model::{
    ColumnMapping, CsvRow, Destination, DestinationError, DuplicateRecord, ExternalRecord,
    ImportValidationResult, InvalidRow, KeyFilter, ModuleConfig, TenantContext, TransformedRow,
    ValidRow,
};

use crate::checks::check_row;
use crate::error::ValidateError;
use crate::transform::transform_row;

/// Validate every row and look up existing records for the clean ones.
///
/// Rows are handled in file order. A row with any field error is filed as
/// invalid and never looked up. Clean rows are compared against the
/// destination on the module's duplicate keys; rows with no value for any
/// key, and all rows of a module without duplicate keys, go straight to the
/// valid bucket. A failed lookup files the row as invalid.
pub async fn validate(
    rows: &[CsvRow],
    mapping: &ColumnMapping,
    config: &ModuleConfig,
    destination: &dyn Destination,
    ctx: &TenantContext,
) -> Result<ImportValidationResult, ValidateError> {
    check_mapping(rows, mapping, config)?;

    let mut result = ImportValidationResult::default();
    for (row_index, row) in rows.iter().enumerate() {
        let outcome = transform_row(row, mapping, config);
        let errors = check_row(&outcome, config);
        if !errors.is_empty() {
            debug!(row_index, errors = errors.len(), "row invalid");
            result.invalid_rows.push(InvalidRow { row_index, errors });
            continue;
        }
        let data = outcome.data;

        match find_duplicate(&data, config, destination, ctx).await {
            Ok(Some((existing_record, matched_fields))) => {
                debug!(
                    row_index,
                    existing = %existing_record.id,
                    "row matches existing record"
                );
                result.duplicates.push(DuplicateRecord {
                    import_row_index: row_index,
                    import_data: data,
                    existing_record,
                    matched_fields,
                    resolution: None,
                });
            }
            Ok(None) => result.valid_rows.push(ValidRow { row_index, data }),
            Err(error) => {
                debug!(row_index, %error, "duplicate lookup failed");
                result.invalid_rows.push(InvalidRow {
                    row_index,
                    errors: vec![format!("duplicate check failed: {error}")],
                });
            }
        }
    }
    result.is_valid = result.invalid_rows.is_empty();

    info!(
        module = %config.module,
        valid = result.valid_rows.len(),
        invalid = result.invalid_rows.len(),
        duplicates = result.duplicates.len(),
        "validated rows"
    );
    Ok(result)
}

fn check_mapping(
    rows: &[CsvRow],
    mapping: &ColumnMapping,
    config: &ModuleConfig,
) -> Result<(), ValidateError> {
    for (source, target) in mapping.mapped() {
        if config.field(target).is_none() {
            return Err(ValidateError::UnknownField {
                module: config.module.clone(),
                field: target.to_string(),
            });
        }
        if let Some(first) = rows.first()
            && !first.headers().iter().any(|header| header == source)
        {
            return Err(ValidateError::UnknownColumn {
                column: source.to_string(),
            });
        }
    }
    Ok(())
}

/// Look up an existing record sharing the row's duplicate-key values.
///
/// Only keys the row has a value for are used; `matched_fields` lists them.
async fn find_duplicate(
    data: &TransformedRow,
    config: &ModuleConfig,
    destination: &dyn Destination,
    ctx: &TenantContext,
) -> Result<Option<(ExternalRecord, Vec<String>)>, DestinationError> {
    let filters: Vec<KeyFilter> = config
        .duplicate_keys
        .iter()
        .filter_map(|key| {
            data.get(key)
                .filter(|value| !value.is_empty())
                .map(|value| KeyFilter::new(key.as_str(), value.clone()))
        })
        .collect();
    if filters.is_empty() {
        return Ok(None);
    }

    let candidates = destination
        .select(ctx, &config.table_name, &filters)
        .await?;
    let found = candidates.into_iter().find(|record| {
        filters.iter().all(|filter| {
            record
                .get(&filter.field)
                .is_some_and(|existing| existing.matches(&filter.value))
        })
    });
    Ok(found.map(|record| {
        let matched = filters.into_iter().map(|filter| filter.field).collect();
        (record, matched)
    }))
}
