//! Graph construction and concrete id resolution

pub mod concrete_id;
pub mod id_graph;
pub mod trivial_reduction;

pub use concrete_id::{trace_root_ids, ConcreteIdCache, ConcreteIdResolver};
pub use id_graph::IterDomainGraph;
pub use trivial_reduction::TrivialReductionInfo;
