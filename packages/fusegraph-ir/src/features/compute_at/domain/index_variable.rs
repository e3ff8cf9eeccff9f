//! Loop index variables
//!
//! Every LOOP class is realised by one for-loop (or by a grid dimension), so
//! every LOOP class gets exactly one index: a fresh symbol, the zero
//! constant, the built-in index of a parallel dimension, or one symbol per
//! stage of a double-buffered loop.

use crate::features::fusion::ParallelType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexVariable {
    /// Loop over broadcast dims only
    Zero,

    /// Built-in index of a block/thread dimension
    ParallelIndex(ParallelType),

    /// Fresh serial index
    Symbol { id: u32, name: String },
}

impl IndexVariable {
    pub fn is_zero(&self) -> bool {
        matches!(self, IndexVariable::Zero)
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, IndexVariable::Symbol { .. })
    }
}

impl fmt::Display for IndexVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexVariable::Zero => write!(f, "0"),
            IndexVariable::ParallelIndex(ptype) => {
                write!(f, "{}", ptype.index_name().unwrap_or(ptype.as_str()))
            }
            IndexVariable::Symbol { name, .. } => write!(f, "{}", name),
        }
    }
}

/// Stage of a double-buffered loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoubleBufferStage {
    /// No stage known yet; resolves to `Main`
    #[default]
    NotApplicable,
    Prologue,
    Main,
    Epilogue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleBufferIndices {
    pub prologue: IndexVariable,
    pub main: IndexVariable,
    pub epilogue: IndexVariable,
}

impl DoubleBufferIndices {
    pub fn get(&self, stage: DoubleBufferStage) -> &IndexVariable {
        match stage {
            DoubleBufferStage::Prologue => &self.prologue,
            DoubleBufferStage::Main | DoubleBufferStage::NotApplicable => &self.main,
            DoubleBufferStage::Epilogue => &self.epilogue,
        }
    }
}

/// Index allocation of one LOOP class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopIndex {
    Single(IndexVariable),
    DoubleBuffered(DoubleBufferIndices),
}

impl LoopIndex {
    pub fn get(&self, stage: DoubleBufferStage) -> &IndexVariable {
        match self {
            LoopIndex::Single(variable) => variable,
            LoopIndex::DoubleBuffered(indices) => indices.get(stage),
        }
    }

    pub fn is_double_buffered(&self) -> bool {
        matches!(self, LoopIndex::DoubleBuffered(_))
    }
}

impl fmt::Display for LoopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopIndex::Single(variable) => write!(f, "{}", variable),
            LoopIndex::DoubleBuffered(indices) => write!(
                f,
                "{{prologue: {}, main: {}, epilogue: {}}}",
                indices.prologue, indices.main, indices.epilogue
            ),
        }
    }
}
