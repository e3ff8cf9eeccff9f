//! Iteration-domain mapping modes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Equivalence relation over iteration domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdMappingMode {
    /// Same extent; broadcasts only match broadcasts
    Exact,

    /// Broadcasts match anything, replay forwards through broadcast merges
    Permissive,

    /// Generated by the same for-loop
    Loop,
}

impl IdMappingMode {
    /// Concrete ids are resolved in this order; LOOP reads EXACT results
    pub const RESOLUTION_ORDER: [IdMappingMode; 3] = [
        IdMappingMode::Permissive,
        IdMappingMode::Exact,
        IdMappingMode::Loop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdMappingMode::Exact => "EXACT",
            IdMappingMode::Permissive => "PERMISSIVE",
            IdMappingMode::Loop => "LOOP",
        }
    }
}

impl fmt::Display for IdMappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
