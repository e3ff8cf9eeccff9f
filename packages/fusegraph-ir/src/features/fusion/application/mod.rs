//! Fusion arena and builder API

pub mod fusion;

pub use fusion::Fusion;
