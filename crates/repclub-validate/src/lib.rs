pub mod checks;
pub mod error;
pub mod transform;
pub mod validator;

pub use checks::check_row;
pub use error::ValidateError;
pub use transform::{TransformOutcome, coerce_value, transform, transform_row};
pub use validator::validate;
