//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema. Loading and export live on `ComputeAtConfig`.

use super::compute_at_config::ComputeAtConfig;
use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1); `None` is `ConfigError::MissingVersion`
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_at: Option<ComputeAtConfig>,
}

pub const SUPPORTED_VERSIONS: &[u32] = &[1];
