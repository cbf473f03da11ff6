//! Ephemeris providers.
//!
//! A provider answers one question: the geocentric ecliptic longitude of a
//! body at a UTC instant. Everything above this module is pure.
//!
//! ## Providers
//!
//! - [`AnalyticEphemeris`]: closed-form approximation, no I/O
//! - [`TableEphemeris`]: fixed readings for tests
//! - [`CachedEphemeris`]: LRU cache in front of any provider
//! - [`FallbackEphemeris`]: timeout and retry around a primary, analytic fallback
//! - `RemoteEphemeris` (feature `remote`): HTTP ephemeris service

pub mod analytic;
pub mod table;
pub mod cached;
pub mod fallback;

#[cfg(feature = "remote")]
pub mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{Body, Precision};

pub use analytic::AnalyticEphemeris;
pub use cached::{CacheStats, CachedEphemeris};
pub use fallback::FallbackEphemeris;
pub use table::{TableEphemeris, Track};

#[cfg(feature = "remote")]
pub use remote::RemoteEphemeris;

/// Earliest instant the kernel accepts (1800-01-01T00:00:00Z).
pub const SUPPORTED_START_UNIX: i64 = -5_364_662_400;

/// End of the supported range, exclusive (2200-01-01T00:00:00Z).
pub const SUPPORTED_END_UNIX: i64 = 7_258_118_400;

/// Whether an instant lies inside the supported range.
pub fn in_supported_range(instant: DateTime<Utc>) -> bool {
    let t = instant.timestamp();
    (SUPPORTED_START_UNIX..SUPPORTED_END_UNIX).contains(&t)
}

/// Supported range as instants.
pub fn supported_range() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        DateTime::from_timestamp(SUPPORTED_START_UNIX, 0).unwrap_or_default(),
        DateTime::from_timestamp(SUPPORTED_END_UNIX, 0).unwrap_or_default(),
    )
}

/// One longitude reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Ecliptic longitude in degrees.
    pub longitude: f64,
    /// Whether a fallback path produced this value.
    pub precision: Precision,
}

impl Reading {
    /// A full-precision reading.
    pub fn exact(longitude: f64) -> Self {
        Self {
            longitude,
            precision: Precision::Exact,
        }
    }

    /// A reading from a fallback path.
    pub fn degraded(longitude: f64, reason: impl Into<String>) -> Self {
        Self {
            longitude,
            precision: Precision::degraded(reason),
        }
    }
}

/// Errors from ephemeris providers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    /// Network failure or timeout. Worth retrying.
    #[error("Transient ephemeris failure: {0}")]
    Transient(String),

    /// The provider cannot answer for this instant or body.
    #[error("No ephemeris coverage for {body} at {instant}")]
    OutOfRange {
        /// Requested body.
        body: Body,
        /// Requested instant.
        instant: DateTime<Utc>,
    },

    /// The provider answered with something unusable.
    #[error("Ephemeris protocol error: {0}")]
    Protocol(String),
}

impl EphemerisError {
    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Source of ecliptic longitudes.
///
/// Implementations must be deterministic for a given (instant, body) unless
/// they report `Precision::Degraded`. Derived bodies (Earth, south node) may
/// be answered directly or left to the caller.
#[async_trait]
pub trait EphemerisProvider: Send + Sync {
    /// Geocentric ecliptic longitude of `body` at `instant`, in degrees.
    async fn longitude(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError>;

    /// Short name for logs and degradation reasons.
    fn name(&self) -> &str {
        "ephemeris"
    }
}

#[async_trait]
impl<P: EphemerisProvider + ?Sized> EphemerisProvider for Arc<P> {
    async fn longitude(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError> {
        (**self).longitude(instant, body).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Provider wrapper configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisConfig {
    /// Per-call timeout for the primary provider, in milliseconds.
    pub timeout_ms: u64,
    /// Retries after a transient failure before falling back.
    pub retries: u32,
    /// LRU capacity for cached readings.
    pub cache_entries: usize,
    /// Whether to cache readings at all.
    pub cache_enabled: bool,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            retries: 1,
            cache_entries: 4_096,
            cache_enabled: true,
        }
    }
}
