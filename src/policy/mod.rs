//! Kernel policy definitions.

pub mod v1;

pub use v1::{KernelPolicy, SolverParams};
