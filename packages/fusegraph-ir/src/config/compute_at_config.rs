//! Compute-at map configuration

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, SUPPORTED_VERSIONS};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComputeAtConfig {
    /// Reject LOOP concrete ids that do not cover every root of their class
    pub validate_loop_completeness: bool,

    /// Name prefix of fresh loop index symbols (`i0`, `i1`, ...)
    pub index_symbol_prefix: String,

    /// Log the full map dump at debug level after construction
    pub dump_on_build: bool,
}

impl Default for ComputeAtConfig {
    fn default() -> Self {
        Self {
            validate_loop_completeness: true,
            index_symbol_prefix: "i".to_string(),
            dump_on_build: false,
        }
    }
}

impl ComputeAtConfig {
    pub fn validate_loop_completeness(mut self, validate: bool) -> Self {
        self.validate_loop_completeness = validate;
        self
    }

    pub fn index_symbol_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_symbol_prefix = prefix.into();
        self
    }

    pub fn dump_on_build(mut self, dump: bool) -> Self {
        self.dump_on_build = dump;
        self
    }

    /// Prefix must be an identifier: `[A-Za-z_][A-Za-z0-9_]*`
    pub fn validate(&self) -> ConfigResult<()> {
        let mut chars = self.index_symbol_prefix.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if !valid {
            return Err(ConfigError::Validation(format!(
                "index_symbol_prefix '{}' is not an identifier",
                self.index_symbol_prefix
            )));
        }
        Ok(())
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        // Version check
        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config = export.compute_at.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            compute_at: Some(self.clone()),
        };
        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }
}
