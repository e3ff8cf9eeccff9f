//! # Transform Replay
//!
//! Graph-transform primitives the compute-at map is built on:
//! - **ids_between**: dependency closure between two domain sets
//! - **PairwiseRootDomainMap**: consumer→producer root correspondence,
//!   exact (broadcast only matches broadcast) or permissive
//! - **BestEffortReplay**: propagate a root correspondence through matching
//!   split/merge steps, optionally forwarding through broadcast merges

pub mod best_effort_replay;
pub mod dependency_check;
pub mod error;
pub mod id_map;
pub mod root_domain_map;

pub use best_effort_replay::{BestEffortReplay, Forwarding};
pub use dependency_check::{history_transforms, ids_between};
pub use error::{ReplayError, ReplayResult};
pub use id_map::IdMap;
pub use root_domain_map::PairwiseRootDomainMap;
