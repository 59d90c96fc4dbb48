//! Optional AI assistant contract.
//!
//! Both calls are best-effort. Callers fall back to deterministic results on
//! any error, and a disabled assistant returns neutral values.

use async_trait::async_trait;
use thiserror::Error;

use crate::mapping::AiFieldSuggestion;
use crate::module::ModuleConfig;
use crate::result::ImportResult;
use crate::table::CsvRow;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssistantError {
    #[error("assistant request failed: {0}")]
    Request(String),

    #[error("assistant returned HTTP {status}")]
    Status { status: u16 },

    #[error("assistant response could not be parsed: {0}")]
    InvalidResponse(String),

    #[error("assistant is not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait Assistant: Send + Sync {
    /// False for the no-op implementation; lets callers skip prompt building.
    fn is_enabled(&self) -> bool {
        true
    }

    /// One suggestion per header the assistant has an opinion on.
    async fn suggest_column_mapping(
        &self,
        headers: &[String],
        sample_rows: &[CsvRow],
        config: &ModuleConfig,
    ) -> Result<Vec<AiFieldSuggestion>, AssistantError>;

    /// Natural-language summary of a finished import. Empty means "none".
    async fn summarize(
        &self,
        result: &ImportResult,
        config: &ModuleConfig,
    ) -> Result<String, AssistantError>;
}
