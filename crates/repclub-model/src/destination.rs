//! Destination record store contract.
//!
//! The pipeline never owns the store's lifecycle or the tenant context; it
//! only issues lookups and single-row writes through this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicate::{ExternalRecord, RecordId};
use crate::value::{FieldValue, TransformedRow};

/// Tenant scope applied to every destination call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub organization_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TenantContext {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Equality filter on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFilter {
    pub field: String,
    pub value: FieldValue,
}

impl KeyFilter {
    pub fn new(field: impl Into<String>, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DestinationError {
    /// A uniqueness or integrity rule rejected the write.
    #[error("constraint violation on {table}: {message}")]
    ConstraintViolation { table: String, message: String },

    #[error("record {id} not found in {table}")]
    NotFound { table: String, id: RecordId },

    /// Transient failure; another attempt may succeed.
    #[error("destination unavailable: {0}")]
    Unavailable(String),

    #[error("destination error: {0}")]
    Backend(String),
}

/// Row-oriented record store reached through query/insert/update calls.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Records in `table` whose fields equal every filter.
    async fn select(
        &self,
        ctx: &TenantContext,
        table: &str,
        filters: &[KeyFilter],
    ) -> Result<Vec<ExternalRecord>, DestinationError>;

    async fn insert(
        &self,
        ctx: &TenantContext,
        table: &str,
        record: &TransformedRow,
    ) -> Result<RecordId, DestinationError>;

    /// Overwrite only the fields present in `partial`.
    async fn update(
        &self,
        ctx: &TenantContext,
        table: &str,
        id: &RecordId,
        partial: &TransformedRow,
    ) -> Result<(), DestinationError>;
}
