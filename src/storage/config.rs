//! Option Sources
//!
//! Raw configuration values for the alert destinations come from command line
//! flags, environment variables, and an optional JSON config file. Each of
//! those is an `OptionSource`; `LayeredOptions` stacks them so that the first
//! layer holding a value wins.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::utils::error::{AppError, AppResult};

/// Default prefix for environment variable options.
pub const ENV_PREFIX: &str = "TEST_ALERTS_";

/// A named-option lookup, e.g. `slack_webhook` or `show_details`.
pub trait OptionSource {
    /// Raw value for `name`, exactly as the source holds it.
    fn raw_option(&self, name: &str) -> Option<String>;

    /// Trimmed value for `name`. Empty values count as unset.
    fn option(&self, name: &str) -> Option<String> {
        self.raw_option(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl OptionSource for HashMap<String, String> {
    fn raw_option(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Options read from `TEST_ALERTS_<NAME>` environment variables.
#[derive(Debug, Clone)]
pub struct EnvOptions {
    prefix: String,
}

impl EnvOptions {
    pub fn new() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.to_ascii_uppercase())
    }
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionSource for EnvOptions {
    fn raw_option(&self, name: &str) -> Option<String> {
        env::var(self.var_name(name)).ok()
    }
}

/// Options loaded from a flat JSON object, e.g.
/// `{"slack_webhook": "https://...", "slack_timeout": 5, "show_details": true}`.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    values: HashMap<String, String>,
}

impl FileOptions {
    /// Load options from a JSON file
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse options from JSON text
    pub fn from_json_str(content: &str) -> AppResult<Self> {
        let object: serde_json::Map<String, Value> = serde_json::from_str(content)?;
        let mut values = HashMap::with_capacity(object.len());

        for (key, value) in object {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AppError::config(format!(
                        "option '{}' must be a string, number or boolean",
                        key
                    )));
                }
            };
            values.insert(key, text);
        }

        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl OptionSource for FileOptions {
    fn raw_option(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Ordered stack of option sources. Earlier layers take precedence.
#[derive(Default)]
pub struct LayeredOptions {
    layers: Vec<Box<dyn OptionSource>>,
}

impl LayeredOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-precedence layer.
    pub fn with_layer(mut self, layer: impl OptionSource + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }
}

impl OptionSource for LayeredOptions {
    fn raw_option(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.option(name))
    }
}

impl std::fmt::Debug for LayeredOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredOptions")
            .field("layers", &self.layers.len())
            .finish()
    }
}
