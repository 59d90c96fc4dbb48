//! `repclub.toml`: defaults for the import command and assistant settings.
//!
//! ```toml
//! [import]
//! module = "members"
//! tenant = "downtown"
//! resolution = "skip"
//! store = "repclub-store.json"
//! modules_file = "modules.toml"
//!
//! [assistant]
//! endpoint = "https://api.openai.com/v1/chat/completions"
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//! timeout_secs = 20
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use repclub_core::AssistantSettings;
use repclub_model::Resolution;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "repclub.toml";
pub const DEFAULT_STORE_FILE: &str = "repclub-store.json";
pub const DEFAULT_TENANT: &str = "default";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub import: ImportDefaults,
    pub assistant: Option<AssistantConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportDefaults {
    pub module: Option<String>,
    pub tenant: Option<String>,
    /// Applied to every flagged duplicate before per-row overrides.
    pub resolution: Option<Resolution>,
    pub store: Option<PathBuf>,
    /// Extra module definitions merged over the built-in ones.
    pub modules_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl AssistantConfig {
    /// Resolve the key from the environment. A missing key is allowed for
    /// local endpoints that do not authenticate.
    pub fn settings(&self) -> AssistantSettings {
        AssistantSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: std::env::var(&self.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl CliConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parse CLI config")
    }

    /// Load `explicit` if given (it must exist), otherwise `repclub.toml`
    /// from the working directory if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file {} does not exist", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("in {}", path.display()))
    }
}
