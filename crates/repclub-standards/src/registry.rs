#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use repclub_model::ModuleConfig;

use crate::builtin::builtin_modules;
use crate::error::StandardsError;

/// On-disk shape of a module TOML file: a list of `[[modules]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleFile {
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Lookup of module configs by module id.
///
/// Configs are shared as `Arc` so an import session can hold one without
/// borrowing the registry.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Arc<ModuleConfig>>,
    order: Vec<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in module.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for config in builtin_modules() {
            registry.insert_unchecked(config);
        }
        registry
    }

    /// Built-ins plus (and overridden by) the modules in `path`.
    pub fn builtin_with_file(path: &Path) -> Result<Self, StandardsError> {
        let mut registry = Self::builtin();
        registry.load_toml(path)?;
        Ok(registry)
    }

    /// Add or replace modules from a TOML file.
    pub fn load_toml(&mut self, path: &Path) -> Result<usize, StandardsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
        let count = self.load_toml_str(&contents, path)?;
        info!(path = %path.display(), modules = count, "loaded module configs");
        Ok(count)
    }

    /// Add or replace modules from TOML text. `origin` is used in errors.
    pub fn load_toml_str(&mut self, contents: &str, origin: &Path) -> Result<usize, StandardsError> {
        let file: ModuleFile = toml::from_str(contents).map_err(|e| StandardsError::Toml {
            path: origin.to_path_buf(),
            source: e,
        })?;
        // Check everything first so a bad file leaves the registry untouched.
        for config in &file.modules {
            config.check().map_err(|e| StandardsError::InvalidModule {
                path: origin.to_path_buf(),
                source: e,
            })?;
        }
        let count = file.modules.len();
        for config in file.modules {
            debug!(module = %config.module, "registering module");
            self.insert_unchecked(config);
        }
        Ok(count)
    }

    pub fn insert(&mut self, config: ModuleConfig) -> Result<(), repclub_model::ModelError> {
        config.check()?;
        self.insert_unchecked(config);
        Ok(())
    }

    fn insert_unchecked(&mut self, config: ModuleConfig) {
        let key = config.module.to_lowercase();
        if !self.modules.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.modules.insert(key, Arc::new(config));
    }

    /// Case-insensitive module lookup.
    pub fn get(&self, module: &str) -> Option<Arc<ModuleConfig>> {
        self.modules.get(&module.trim().to_lowercase()).cloned()
    }

    pub fn require(&self, module: &str) -> Result<Arc<ModuleConfig>, StandardsError> {
        self.get(module)
            .ok_or_else(|| StandardsError::UnknownModule {
                module: module.to_string(),
                available: self.order.join(", "),
            })
    }

    /// Modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleConfig> {
        self.order
            .iter()
            .filter_map(|key| self.modules.get(key))
            .map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
