//! Iteration Domain
//!
//! One logical loop dimension of a tensor. Domains are created by the
//! `Fusion` arena either as roots of a tensor or as outputs of a split/merge,
//! and are never shared between tensors.

use crate::shared::models::{IterDomainId, TransformId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extent of an iteration domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extent {
    /// Compile-time constant
    Const(i64),

    /// Symbolic size (an input dimension or an expression over them)
    Symbolic(String),
}

impl Extent {
    #[inline]
    pub fn constant(value: i64) -> Self {
        Extent::Const(value)
    }

    #[inline]
    pub fn symbolic(name: impl Into<String>) -> Self {
        Extent::Symbolic(name.into())
    }

    pub fn as_const(&self) -> Option<i64> {
        match self {
            Extent::Const(v) => Some(*v),
            Extent::Symbolic(_) => None,
        }
    }

    pub fn is_one(&self) -> bool {
        self.as_const() == Some(1)
    }

    /// Extent of the outer output of an inner split by `factor`
    ///
    /// Constants that cannot be divided exactly in `i64` stay symbolic.
    pub fn ceil_div(&self, factor: i64) -> Extent {
        match self {
            Extent::Const(v) if factor > 0 && *v >= 0 => {
                Extent::Const(v / factor + i64::from(v % factor != 0))
            }
            _ => Extent::Symbolic(format!("ceilDiv({}, {})", self, factor)),
        }
    }

    /// Extent of a merge output
    ///
    /// A constant product that overflows `i64` is kept as a symbolic product.
    pub fn mul(&self, other: &Extent) -> Extent {
        match (self, other) {
            (Extent::Const(a), Extent::Const(b)) => match a.checked_mul(*b) {
                Some(product) => Extent::Const(product),
                None => Extent::Symbolic(format!("{} * {}", a, b)),
            },
            (Extent::Const(1), e) | (e, Extent::Const(1)) => e.clone(),
            (a, b) => Extent::Symbolic(format!("{} * {}", a, b)),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Const(v) => write!(f, "{}", v),
            Extent::Symbolic(s) => write!(f, "{}", s),
        }
    }
}

/// Iteration kind of a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IterType {
    Iteration,
    Reduction,
    Broadcast,
    Gather,
}

impl IterType {
    /// Single-letter prefix used when printing domains
    pub fn prefix(&self) -> char {
        match self {
            IterType::Iteration => 'i',
            IterType::Reduction => 'r',
            IterType::Broadcast => 'b',
            IterType::Gather => 'g',
        }
    }
}

/// Parallel binding of a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParallelType {
    #[default]
    Serial,
    BIDx,
    BIDy,
    BIDz,
    TIDx,
    TIDy,
    TIDz,
    Vectorize,
    Unroll,
}

impl ParallelType {
    /// Bound to a block or thread dimension of the launch grid
    pub fn is_thread(&self) -> bool {
        self.is_block_dim() || self.is_thread_dim()
    }

    pub fn is_block_dim(&self) -> bool {
        matches!(self, ParallelType::BIDx | ParallelType::BIDy | ParallelType::BIDz)
    }

    pub fn is_thread_dim(&self) -> bool {
        matches!(self, ParallelType::TIDx | ParallelType::TIDy | ParallelType::TIDz)
    }

    /// Name of the built-in index of a grid dimension
    pub fn index_name(&self) -> Option<&'static str> {
        match self {
            ParallelType::BIDx => Some("blockIdx.x"),
            ParallelType::BIDy => Some("blockIdx.y"),
            ParallelType::BIDz => Some("blockIdx.z"),
            ParallelType::TIDx => Some("threadIdx.x"),
            ParallelType::TIDy => Some("threadIdx.y"),
            ParallelType::TIDz => Some("threadIdx.z"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParallelType::Serial => "S",
            ParallelType::BIDx => "BIDx",
            ParallelType::BIDy => "BIDy",
            ParallelType::BIDz => "BIDz",
            ParallelType::TIDx => "TIDx",
            ParallelType::TIDy => "TIDy",
            ParallelType::TIDz => "TIDz",
            ParallelType::Vectorize => "V",
            ParallelType::Unroll => "UR",
        }
    }
}

impl fmt::Display for ParallelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the iteration-domain graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterDomain {
    pub id: IterDomainId,

    pub extent: Extent,

    pub iter_type: IterType,

    pub parallel_type: ParallelType,

    /// Produced by a reshape-like factoring (view rfactor)
    pub is_rfactor_product: bool,

    /// Split/merge that produced this domain; `None` for roots
    pub definition: Option<TransformId>,

    /// Loop over this domain is double buffered
    pub double_buffered: bool,

    /// Loop over this domain is extended with halo cells
    pub halo_extended: bool,
}

impl IterDomain {
    pub fn new(id: IterDomainId, extent: Extent, iter_type: IterType) -> Self {
        Self {
            id,
            extent,
            iter_type,
            parallel_type: ParallelType::Serial,
            is_rfactor_product: false,
            definition: None,
            double_buffered: false,
            halo_extended: false,
        }
    }

    #[inline]
    pub fn is_broadcast(&self) -> bool {
        self.iter_type == IterType::Broadcast
    }

    #[inline]
    pub fn is_reduction(&self) -> bool {
        self.iter_type == IterType::Reduction
    }

    #[inline]
    pub fn is_thread(&self) -> bool {
        self.parallel_type.is_thread()
    }
}

impl fmt::Display for IterDomain {
    /// Renders as `iS12{i0}`: kind, binding, handle number, extent
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{{{}}}",
            self.iter_type.prefix(),
            self.parallel_type,
            self.id.raw(),
            self.extent
        )?;
        if self.is_rfactor_product {
            write!(f, "rf")?;
        }
        Ok(())
    }
}
