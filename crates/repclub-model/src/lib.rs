//! Shared data model for the Rep Club CSV import pipeline.

pub mod assistant;
pub mod destination;
pub mod duplicate;
pub mod error;
pub mod mapping;
pub mod module;
pub mod result;
pub mod table;
pub mod validation;
pub mod value;

pub use assistant::{Assistant, AssistantError};
pub use destination::{Destination, DestinationError, KeyFilter, TenantContext};
pub use duplicate::{DuplicateRecord, ExternalRecord, RecordId, Resolution};
pub use error::{ModelError, Result};
pub use mapping::{AiFieldSuggestion, ColumnHint, ColumnMapping, MappingEntry};
pub use module::{FieldDefinition, FieldType, ModuleConfig};
pub use result::{ImportResult, RowError, RowOutcome};
pub use table::{CsvRow, ParsedCsvData};
pub use validation::{ImportValidationResult, InvalidRow, RowBucket, ValidRow};
pub use value::{FieldValue, TransformedRow};
