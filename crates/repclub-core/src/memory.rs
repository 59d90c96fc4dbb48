//! In-process destination backed by per-tenant tables, with optional JSON
//! persistence. Used by the CLI store file and in tests.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use repclub_model::{
    Destination, DestinationError, ExternalRecord, FieldValue, KeyFilter, RecordId,
    TenantContext, TransformedRow,
};

use crate::error::ImportError;

type Tables = BTreeMap<String, Vec<ExternalRecord>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    next_id: u64,
    /// organization id -> table name -> records
    #[serde(default)]
    tenants: BTreeMap<String, Tables>,
}

/// Records grouped by tenant and table.
///
/// Lookups compare values the way duplicate detection does: text is trimmed
/// and case-insensitive, and integers equal their decimal counterparts.
/// Fields registered with [`MemoryDestination::with_unique_key`] reject a
/// second record holding the same value.
#[derive(Debug, Default)]
pub struct MemoryDestination {
    data: RwLock<StoreData>,
    unique_keys: BTreeMap<String, Vec<String>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to be unique within `table` for every tenant.
    pub fn with_unique_key(mut self, table: &str, field: &str) -> Self {
        self.unique_keys
            .entry(table.to_string())
            .or_default()
            .push(field.to_string());
        self
    }

    /// Load a store file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        if !path.exists() {
            debug!(path = %path.display(), "store file not found; starting empty");
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ImportError::StoreIo {
            path: path.to_path_buf(),
            source,
        })?;
        let data: StoreData =
            serde_json::from_str(&contents).map_err(|source| ImportError::StoreFormat {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), tenants = data.tenants.len(), "loaded store");
        Ok(Self {
            data: RwLock::new(data),
            unique_keys: BTreeMap::new(),
        })
    }

    /// Write the whole store as pretty JSON.
    pub async fn save(&self, path: &Path) -> Result<(), ImportError> {
        let data = self.data.read().await;
        let json = serde_json::to_string_pretty(&*data).map_err(|source| ImportError::StoreFormat {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| ImportError::StoreIo {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "saved store");
        Ok(())
    }

    /// Snapshot of one tenant's table.
    pub async fn records(&self, ctx: &TenantContext, table: &str) -> Vec<ExternalRecord> {
        self.data
            .read()
            .await
            .tenants
            .get(&ctx.organization_id)
            .and_then(|tables| tables.get(table))
            .cloned()
            .unwrap_or_default()
    }

    fn check_unique(
        &self,
        table: &str,
        records: &[ExternalRecord],
        candidate: &TransformedRow,
        skip_id: Option<&RecordId>,
    ) -> Result<(), DestinationError> {
        let Some(keys) = self.unique_keys.get(table) else {
            return Ok(());
        };
        for key in keys {
            let Some(value) = candidate.get(key).filter(|value| !value.is_empty()) else {
                continue;
            };
            let clash = records
                .iter()
                .filter(|record| Some(&record.id) != skip_id)
                .any(|record| record.get(key).is_some_and(|other| other.matches(value)));
            if clash {
                return Err(DestinationError::ConstraintViolation {
                    table: table.to_string(),
                    message: format!("duplicate value for {key}"),
                });
            }
        }
        Ok(())
    }
}

fn matches_filters(record: &ExternalRecord, filters: &[KeyFilter]) -> bool {
    filters.iter().all(|filter| {
        record
            .get(&filter.field)
            .is_some_and(|value| value.matches(&filter.value))
    })
}

#[async_trait]
impl Destination for MemoryDestination {
    async fn select(
        &self,
        ctx: &TenantContext,
        table: &str,
        filters: &[KeyFilter],
    ) -> Result<Vec<ExternalRecord>, DestinationError> {
        let data = self.data.read().await;
        Ok(data
            .tenants
            .get(&ctx.organization_id)
            .and_then(|tables| tables.get(table))
            .map(|records| {
                records
                    .iter()
                    .filter(|record| matches_filters(record, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        ctx: &TenantContext,
        table: &str,
        record: &TransformedRow,
    ) -> Result<RecordId, DestinationError> {
        let mut data = self.data.write().await;
        data.next_id += 1;
        let id = RecordId::new(format!("{table}-{}", data.next_id));
        let records = data
            .tenants
            .entry(ctx.organization_id.clone())
            .or_default()
            .entry(table.to_string())
            .or_default();
        self.check_unique(table, records, record, None)?;

        let mut fields = record.clone();
        fields.insert(
            "organization_id".to_string(),
            FieldValue::text(ctx.organization_id.as_str()),
        );
        records.push(ExternalRecord {
            id: id.clone(),
            fields,
        });
        Ok(id)
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        table: &str,
        id: &RecordId,
        partial: &TransformedRow,
    ) -> Result<(), DestinationError> {
        let mut data = self.data.write().await;
        let not_found = || DestinationError::NotFound {
            table: table.to_string(),
            id: id.clone(),
        };
        let records = data
            .tenants
            .get_mut(&ctx.organization_id)
            .and_then(|tables| tables.get_mut(table))
            .ok_or_else(not_found)?;
        self.check_unique(table, records, partial, Some(id))?;
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(not_found)?;
        record
            .fields
            .extend(partial.iter().map(|(key, value)| (key.clone(), value.clone())));
        Ok(())
    }
}
