//! Assistant implementations: a no-op one and an HTTP client for
//! OpenAI-compatible chat-completion endpoints.

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use repclub_ingest::build_column_hints;
use repclub_model::{
    AiFieldSuggestion, Assistant, AssistantError, CsvRow, ImportResult, ModuleConfig,
    ParsedCsvData,
};

/// Sample values per column included in the mapping prompt.
const PROMPT_SAMPLE_VALUES: usize = 3;
/// Row errors quoted in the summary prompt.
const PROMPT_ERROR_LINES: usize = 10;

/// Assistant used when none is configured. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAssistant;

#[async_trait]
impl Assistant for NoopAssistant {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn suggest_column_mapping(
        &self,
        _headers: &[String],
        _sample_rows: &[CsvRow],
        _config: &ModuleConfig,
    ) -> Result<Vec<AiFieldSuggestion>, AssistantError> {
        Ok(Vec::new())
    }

    async fn summarize(
        &self,
        _result: &ImportResult,
        _config: &ModuleConfig,
    ) -> Result<String, AssistantError> {
        Ok(String::new())
    }
}

/// Connection settings for [`CompletionAssistant`].
#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantSettings {
    /// Full chat-completions URL, e.g. `https://api.openai.com/v1/chat/completions`.
    pub endpoint: String,
    pub model: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl fmt::Debug for AssistantSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

/// Assistant backed by a chat-completion HTTP endpoint.
pub struct CompletionAssistant {
    client: reqwest::Client,
    settings: AssistantSettings,
}

impl CompletionAssistant {
    pub fn new(settings: AssistantSettings) -> Result<Self, AssistantError> {
        if settings.endpoint.trim().is_empty() {
            return Err(AssistantError::NotConfigured("endpoint is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|error| AssistantError::NotConfigured(error.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Send one system+user exchange and return the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistantError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
        };

        let mut request = self.client.post(&self.settings.endpoint).json(&body);
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|error| AssistantError::Request(error.to_string()))?;
        let response = Self::ensure_success(response)?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|error| AssistantError::InvalidResponse(error.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AssistantError::InvalidResponse("response has no content".to_string()))
    }

    fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AssistantError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AssistantError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl Assistant for CompletionAssistant {
    async fn suggest_column_mapping(
        &self,
        headers: &[String],
        sample_rows: &[CsvRow],
        config: &ModuleConfig,
    ) -> Result<Vec<AiFieldSuggestion>, AssistantError> {
        let prompt = build_mapping_prompt(headers, sample_rows, config);
        let reply = self.complete(MAPPING_SYSTEM_PROMPT, &prompt).await?;
        let suggestions = parse_mapping_response(&reply, headers, config)?;
        debug!(count = suggestions.len(), "parsed mapping suggestions");
        Ok(suggestions)
    }

    async fn summarize(
        &self,
        result: &ImportResult,
        config: &ModuleConfig,
    ) -> Result<String, AssistantError> {
        let prompt = build_summary_prompt(result, config);
        let reply = self.complete(SUMMARY_SYSTEM_PROMPT, &prompt).await?;
        Ok(reply.trim().to_string())
    }
}

const MAPPING_SYSTEM_PROMPT: &str = "You map spreadsheet columns to database fields. \
Reply with a JSON array only. Each element has sourceColumn, suggestedTarget \
(a field name or null to ignore the column) and confidence between 0 and 1.";

const SUMMARY_SYSTEM_PROMPT: &str = "You summarize data imports for gym staff in \
two or three plain sentences. Mention problems and what to do about them.";

/// User message for a mapping request: target fields, then each column with
/// its statistics and a few sample values.
pub fn build_mapping_prompt(
    headers: &[String],
    sample_rows: &[CsvRow],
    config: &ModuleConfig,
) -> String {
    let sample = ParsedCsvData::new(
        headers.to_vec(),
        sample_rows.iter().map(|row| row.values().to_vec()).collect(),
        Vec::new(),
    );
    let hints = build_column_hints(&sample);

    let mut prompt = format!("Target: {} ({})\nFields:\n", config.display_name, config.module);
    for field in &config.fields {
        let _ = write!(
            prompt,
            "- {} ({}): {}",
            field.name,
            field.field_type.as_str(),
            field.label
        );
        if field.required {
            prompt.push_str(" [required]");
        }
        if !field.options.is_empty() {
            let _ = write!(prompt, " options: {}", field.options.join(", "));
        }
        prompt.push('\n');
    }

    prompt.push_str("Columns:\n");
    for (col_idx, header) in headers.iter().enumerate() {
        let values: Vec<&str> = sample_rows
            .iter()
            .filter_map(|row| row.values().get(col_idx).map(String::as_str))
            .filter(|value| !value.is_empty())
            .take(PROMPT_SAMPLE_VALUES)
            .collect();
        let _ = write!(prompt, "- {header}: samples [{}]", values.join(" | "));
        if let Some(hint) = hints.get(header) {
            let _ = write!(
                prompt,
                " numeric={} empty={:.0}% unique={:.0}%",
                hint.is_numeric,
                hint.null_ratio * 100.0,
                hint.unique_ratio * 100.0
            );
        }
        prompt.push('\n');
    }
    prompt
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MappingReply {
    List(Vec<AiFieldSuggestion>),
    Wrapped { suggestions: Vec<AiFieldSuggestion> },
}

/// Strip a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a mapping reply into suggestions.
///
/// Accepts a bare array or an object with a `suggestions` array, optionally
/// inside a code fence. Confidences are clamped to `[0, 1]`. Suggestions for
/// columns not in `headers` or targets not declared by `config` are dropped,
/// as are repeated columns after the first.
pub fn parse_mapping_response(
    reply: &str,
    headers: &[String],
    config: &ModuleConfig,
) -> Result<Vec<AiFieldSuggestion>, AssistantError> {
    let parsed: MappingReply = serde_json::from_str(strip_code_fence(reply))
        .map_err(|error| AssistantError::InvalidResponse(error.to_string()))?;
    let suggestions = match parsed {
        MappingReply::List(list) => list,
        MappingReply::Wrapped { suggestions } => suggestions,
    };

    let mut seen = BTreeSet::new();
    Ok(suggestions
        .into_iter()
        .filter(|suggestion| headers.contains(&suggestion.source_column))
        .filter(|suggestion| {
            suggestion
                .suggested_target
                .as_deref()
                .is_none_or(|target| config.field(target).is_some())
        })
        .filter(|suggestion| seen.insert(suggestion.source_column.clone()))
        .map(|mut suggestion| {
            suggestion.confidence = if suggestion.confidence.is_nan() {
                0.0
            } else {
                suggestion.confidence.clamp(0.0, 1.0)
            };
            suggestion
        })
        .collect())
}

/// User message for a summary request.
pub fn build_summary_prompt(result: &ImportResult, config: &ModuleConfig) -> String {
    let mut prompt = format!(
        "Import into {}: {} imported, {} merged, {} skipped, {} failed.\n",
        config.display_name, result.imported, result.merged, result.skipped, result.failed
    );
    if !result.errors.is_empty() {
        prompt.push_str("Errors:\n");
        for error in result.errors.iter().take(PROMPT_ERROR_LINES) {
            let _ = writeln!(prompt, "- row {}: {}", error.row_index + 1, error.error);
        }
        if result.errors.len() > PROMPT_ERROR_LINES {
            let _ = writeln!(
                prompt,
                "- and {} more",
                result.errors.len() - PROMPT_ERROR_LINES
            );
        }
    }
    prompt
}
