use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use repclub_core::PreviewStep;
use repclub_map::MappingSource;
use repclub_model::ModuleConfig;
use repclub_report::ImportSummary;

/// Preview rows listed per bucket before truncating.
const PREVIEW_ROW_LIMIT: usize = 10;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn modules_table<'a>(modules: impl Iterator<Item = &'a ModuleConfig>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Name"),
        header_cell("Table"),
        header_cell("Fields"),
        header_cell("Duplicate keys"),
    ]);
    apply_table_style(&mut table);
    for config in modules {
        let fields: Vec<String> = config
            .fields
            .iter()
            .map(|field| {
                if field.required {
                    format!("{}*", field.name)
                } else {
                    field.name.clone()
                }
            })
            .collect();
        let keys = if config.duplicate_keys.is_empty() {
            "-".to_string()
        } else {
            config.duplicate_keys.join(" + ")
        };
        table.add_row(vec![
            Cell::new(&config.module).fg(Color::Cyan),
            Cell::new(&config.display_name),
            Cell::new(&config.table_name),
            Cell::new(fields.join(", ")),
            Cell::new(keys),
        ]);
    }
    table
}

fn source_cell(source: MappingSource) -> Cell {
    match source {
        MappingSource::Auto => Cell::new("auto"),
        MappingSource::Assistant => Cell::new("assistant").fg(Color::Magenta),
        MappingSource::Manual => Cell::new("manual").fg(Color::Blue),
        MappingSource::Unmapped => dim_cell("-"),
    }
}

pub fn print_preview(preview: &PreviewStep) {
    let mapping = preview.mapping();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Field"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut table);
    for entry in mapping.mapping().entries() {
        let field = match &entry.target_field {
            Some(field) => Cell::new(field),
            None => dim_cell("(ignored)"),
        };
        table.add_row(vec![
            Cell::new(&entry.source_column),
            field,
            source_cell(mapping.source(&entry.source_column)),
        ]);
    }
    println!("Mapping:");
    println!("{table}");

    let validation = preview.validation();
    let mut counts = Table::new();
    counts.set_header(vec![
        header_cell("Rows"),
        header_cell("Valid"),
        header_cell("Invalid"),
        header_cell("Duplicates"),
    ]);
    apply_table_style(&mut counts);
    counts.add_row(vec![
        Cell::new(validation.total_rows()),
        count_cell(validation.valid_rows.len(), Color::Green),
        count_cell(validation.invalid_rows.len(), Color::Red),
        count_cell(validation.duplicates.len(), Color::Yellow),
    ]);
    for index in 0..4 {
        align_column(&mut counts, index, CellAlignment::Right);
    }
    println!("{counts}");

    if !validation.invalid_rows.is_empty() {
        println!("Invalid rows:");
        for row in validation.invalid_rows.iter().take(PREVIEW_ROW_LIMIT) {
            println!("  row {}: {}", row.row_index + 1, row.errors.join("; "));
        }
        print_more(validation.invalid_rows.len());
    }

    if !validation.duplicates.is_empty() {
        let display_field = &preview.config().duplicate_display_field;
        println!("Possible duplicates:");
        for duplicate in validation.duplicates.iter().take(PREVIEW_ROW_LIMIT) {
            println!(
                "  row {} matches {} ({}) on {}",
                duplicate.import_row_index + 1,
                duplicate.existing_record.id,
                duplicate.existing_record.display_value(display_field),
                duplicate.matched_fields.join(", ")
            );
        }
        print_more(validation.duplicates.len());
    }
}

fn print_more(total: usize) {
    if total > PREVIEW_ROW_LIMIT {
        println!("  ... and {} more", total - PREVIEW_ROW_LIMIT);
    }
}

pub fn print_summary(summary: &ImportSummary) {
    println!("{}", summary.headline());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Imported"),
        header_cell("Merged"),
        header_cell("Skipped"),
        header_cell("Failed"),
        header_cell("Invalid"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        count_cell(summary.imported, Color::Green),
        count_cell(summary.merged, Color::Cyan),
        count_cell(summary.skipped, Color::Yellow),
        count_cell(summary.failed, Color::Red),
        count_cell(summary.invalid_rows, Color::Red),
    ]);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    println!("{table}");

    for note in summary.warnings() {
        eprintln!("warning: {note}");
    }
    if !summary.errors.is_empty() {
        eprintln!("Errors:");
        for error in summary.errors.iter().take(PREVIEW_ROW_LIMIT) {
            eprintln!("- row {}: {}", error.row_index + 1, error.error);
        }
        if summary.errors.len() > PREVIEW_ROW_LIMIT {
            eprintln!("- ... and {} more", summary.errors.len() - PREVIEW_ROW_LIMIT);
        }
    }
    if let Some(text) = &summary.ai_summary {
        println!();
        println!("{text}");
    }
}
