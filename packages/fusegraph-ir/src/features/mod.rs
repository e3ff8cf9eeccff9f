//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure data model (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Algorithm implementations

// Upstream operation graph: tensors, iteration domains, transforms
pub mod fusion;

// Root-domain correspondence and best-effort transform replay
pub mod transform_replay;

// EXACT / PERMISSIVE / LOOP equivalence and concrete-id resolution
pub mod compute_at;
