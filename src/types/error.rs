//! Input validation and reference-data integrity errors.

use chrono::{DateTime, Utc};

/// Rejected input. Raised before any computation starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Longitude was NaN or infinite.
    #[error("Longitude is not finite: {0}")]
    NonFiniteLongitude(f64),
    /// Gate number outside 1..=64.
    #[error("Gate out of range (1-64): {0}")]
    GateOutOfRange(u8),
    /// Line number outside 1..=6.
    #[error("Line out of range (1-6): {0}")]
    LineOutOfRange(u8),
    /// Instant outside the range the kernel supports.
    #[error("Instant {instant} outside supported range {start} .. {end}")]
    InstantOutOfRange {
        /// The rejected instant.
        instant: DateTime<Utc>,
        /// Earliest supported instant.
        start: DateTime<Utc>,
        /// Latest supported instant (exclusive).
        end: DateTime<Utc>,
    },
    /// Instant string could not be parsed as RFC 3339.
    #[error("Invalid instant '{input}': {reason}")]
    InvalidInstant {
        /// The raw input.
        input: String,
        /// Parser message.
        reason: String,
    },
}

/// A reference table failed its integrity check.
///
/// These indicate a data-preparation bug, never a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    /// The gate order table is not a permutation of 1..=64.
    #[error("Gate order table is not a permutation of 1-64: {0}")]
    GateOrder(String),
    /// The quarter partition does not cover each gate exactly once.
    #[error("Quarter partition invalid: {0}")]
    QuarterPartition(String),
    /// The channel table is malformed.
    #[error("Channel table invalid: {0}")]
    ChannelTable(String),
    /// A gate has no harmonic partner entry.
    #[error("Gate {0} has no harmonic partner entry")]
    MissingPartner(u8),
    /// A looked-up gate is missing from an exhaustive table.
    #[error("Gate {gate} missing from {table}")]
    MissingGate {
        /// Table name.
        table: &'static str,
        /// The gate that was not found.
        gate: u8,
    },
    /// A channel has no center mapping.
    #[error("Channel {0} has no center mapping")]
    UnknownChannel(String),
    /// A stored cross number contradicts the quarter rule.
    #[error("Cross '{name}' ({key}) stores number {stored:?}, quarter rule gives {derived:?}")]
    CrossNumberMismatch {
        /// Cross display name.
        name: String,
        /// Gate key.
        key: String,
        /// Number stored in the table.
        stored: Option<u8>,
        /// Number derived from quarter and angle.
        derived: Option<u8>,
    },
    /// An embedded table could not be parsed.
    #[error("Reference table '{table}' is malformed: {reason}")]
    Malformed {
        /// Table name.
        table: &'static str,
        /// Parser message.
        reason: String,
    },
    /// A chart side is missing one of the 13 bodies.
    #[error("Chart side is missing body {0}")]
    MissingBody(String),
}
