//! Configuration System
//!
//! Tuning knobs of the compute-at map, loadable from a versioned YAML file.
//!
//! # Examples
//!
//! ```rust,ignore
//! use fusegraph_ir::config::ComputeAtConfig;
//!
//! // Defaults
//! let config = ComputeAtConfig::default();
//!
//! // Builder-style override
//! let config = ComputeAtConfig::default().index_symbol_prefix("idx").dump_on_build(true);
//!
//! // YAML (`version: 1`)
//! let config = ComputeAtConfig::from_yaml("compute_at.yaml")?;
//! ```

pub mod compute_at_config;
pub mod error;
pub mod io;

pub use compute_at_config::ComputeAtConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigExportV1;
