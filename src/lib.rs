//! # bodygraph-kernel
//!
//! Deterministic birth-to-bodygraph computation.
//!
//! The kernel answers one question:
//!
//! > Given a birth instant, which gates, channels and centers are activated,
//! > and how does the resulting bodygraph classify?
//!
//! ## Pipeline
//!
//! ```text
//! birth ─▶ EphemerisProvider ─▶ ActivationMapper ─▶ personality side
//!              │
//!        DesignSolver (Sun − 88°) ─▶ ActivationMapper ─▶ design side
//!                                         │
//!        Chart ─▶ BodygraphAnalyzer / CrossClassifier / FixingCalculator
//!                                         │
//!                                  BodygraphReport
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same birth + same policy + same tables + deterministic provider →
//!   identical report fingerprint
//! - Activations, channels and centers are ordered (`BTreeMap` / `BTreeSet`)
//! - Fallback paths never fail silently: they mark the result
//!   [`Precision::Degraded`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod tables;
pub mod policy;
pub mod canonical;
pub mod mapper;
pub mod ephemeris;
pub mod solver;
pub mod assembler;
pub mod analyzer;
pub mod cross;
pub mod fixing;
pub mod kernel;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    Activation, Authority, Body, BodygraphAnalysis, BodygraphType, Center, Channel, Chart,
    ChartFixing, ChartSide, ConsistencyError, CrossAngle, CrossKey, Definition, FixingAnnotation,
    FixingState, Gate, IncarnationCross, Line, Precision, Profile, Side, ValidationError,
};
pub use tables::{HarmonicPartners, PartnerPolicy, ReferenceTables};
pub use policy::{KernelPolicy, SolverParams};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use mapper::{normalize_degrees, ActivationMapper, DEGREES_PER_GATE, DEGREES_PER_LINE};
pub use ephemeris::{
    AnalyticEphemeris, CacheStats, CachedEphemeris, EphemerisConfig, EphemerisError,
    EphemerisProvider, FallbackEphemeris, Reading, TableEphemeris, Track,
};
#[cfg(feature = "remote")]
pub use ephemeris::RemoteEphemeris;
pub use solver::{DesignMoment, DesignSolver};
pub use assembler::ChartAssembler;
pub use analyzer::BodygraphAnalyzer;
pub use cross::CrossClassifier;
pub use fixing::FixingCalculator;
pub use kernel::{BodygraphKernel, BodygraphReport, KernelError};

/// Report schema version.
///
/// Bump when the report layout or any classification rule changes.
pub const BODYGRAPH_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version.
pub const DEFAULT_POLICY_VERSION: &str = "bodygraph_policy_v1";
