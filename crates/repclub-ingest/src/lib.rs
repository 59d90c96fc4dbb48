pub mod csv_table;
pub mod error;
pub mod hints;

pub use csv_table::{parse_csv_bytes, read_csv_file};
pub use error::IngestError;
pub use hints::build_column_hints;
