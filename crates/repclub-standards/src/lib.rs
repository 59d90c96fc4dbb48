#![deny(unsafe_code)]

pub mod builtin;
pub mod error;
pub mod registry;

pub use crate::builtin::builtin_modules;
pub use crate::error::StandardsError;
pub use crate::registry::{ModuleFile, ModuleRegistry};
