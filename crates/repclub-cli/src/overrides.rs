//! Parsers for repeatable `--map` and `--resolve-row` arguments.

use repclub_model::Resolution;

/// `--map COLUMN=FIELD`, or `COLUMN=-` to ignore the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapOverride {
    pub column: String,
    pub field: Option<String>,
}

/// `--resolve-row ROW=DECISION` with a 1-based data row number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowResolution {
    /// 0-based, as used by the pipeline.
    pub row_index: usize,
    pub resolution: Resolution,
}

/// Splits on the last `=` so column names may contain one.
pub fn parse_map_override(value: &str) -> Result<MapOverride, String> {
    let (column, field) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected COLUMN=FIELD, got '{value}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{value}'"));
    }
    let field = field.trim();
    let field = if field.is_empty() || field == "-" {
        None
    } else {
        Some(field.to_string())
    };
    Ok(MapOverride {
        column: column.to_string(),
        field,
    })
}

pub fn parse_resolution(value: &str) -> Result<Resolution, String> {
    value.parse()
}

pub fn parse_row_resolution(value: &str) -> Result<RowResolution, String> {
    let (row, decision) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=merge|create|skip, got '{value}'"))?;
    let row: usize = row
        .trim()
        .parse()
        .map_err(|_| format!("row must be a positive number, got '{}'", row.trim()))?;
    if row == 0 {
        return Err("rows are numbered from 1".to_string());
    }
    Ok(RowResolution {
        row_index: row - 1,
        resolution: decision.parse()?,
    })
}
