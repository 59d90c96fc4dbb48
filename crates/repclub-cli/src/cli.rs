//! CLI argument definitions for the import tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use repclub_model::Resolution;

use crate::overrides::{
    MapOverride, RowResolution, parse_map_override, parse_resolution, parse_row_resolution,
};

#[derive(Parser)]
#[command(
    name = "repclub-import",
    version,
    about = "Import gym members, leads, staff, products and classes from CSV",
    long_about = "Import CSV files into Rep Club.\n\n\
                  Columns are matched to fields automatically (optionally with an AI\n\
                  assistant), rows are validated and checked for duplicates, and each\n\
                  row is written on its own so one bad row never blocks the rest."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in trace logs. They contain personal data.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Config file (default: ./repclub.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List importable modules and their fields.
    Modules,

    /// Write a blank CSV template for a module.
    Template(TemplateArgs),

    /// Import a CSV file.
    Import(ImportArgs),
}

#[derive(Args)]
pub struct TemplateArgs {
    /// Module id, e.g. members.
    #[arg(value_name = "MODULE")]
    pub module: String,

    /// Output path (default: the module's template file name).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Module id (falls back to [import].module in the config).
    #[arg(long = "module", short = 'm', value_name = "MODULE")]
    pub module: Option<String>,

    /// JSON store file acting as the destination.
    #[arg(long = "store", value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Organization the records belong to.
    #[arg(long = "tenant", value_name = "ID")]
    pub tenant: Option<String>,

    /// Map a column to a field; `COLUMN=-` ignores the column. Repeatable.
    #[arg(long = "map", value_name = "COLUMN=FIELD", value_parser = parse_map_override)]
    pub map: Vec<MapOverride>,

    /// Decision for every flagged duplicate (merge, create, skip).
    #[arg(long = "resolve", value_name = "DECISION", value_parser = parse_resolution)]
    pub resolve: Option<Resolution>,

    /// Decision for one duplicate by 1-based data row. Repeatable; wins over --resolve.
    #[arg(long = "resolve-row", value_name = "ROW=DECISION", value_parser = parse_row_resolution)]
    pub resolve_row: Vec<RowResolution>,

    /// Ask the configured assistant to map columns left unmapped and to
    /// summarize the result.
    #[arg(long = "ai")]
    pub ai: bool,

    /// Stop after validation and print the preview.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write failed rows as a Row,Error CSV.
    #[arg(long = "error-report", value_name = "PATH")]
    pub error_report: Option<PathBuf>,

    /// Write rows rejected by validation as a Row,Error CSV.
    #[arg(long = "validation-report", value_name = "PATH")]
    pub validation_report: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
