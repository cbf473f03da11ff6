//! In-memory ephemeris for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::{EphemerisError, EphemerisProvider, Reading};
use crate::mapper::normalize_degrees;
use crate::types::Body;

/// Longitude of a body as a function of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track {
    /// Same longitude at every instant.
    Fixed(f64),
    /// Uniform motion from a reference instant.
    Linear {
        /// Reference instant.
        epoch: DateTime<Utc>,
        /// Longitude at `epoch`.
        longitude: f64,
        /// Motion in degrees per day (negative for retrograde).
        degrees_per_day: f64,
    },
}

impl Track {
    fn at(&self, instant: DateTime<Utc>) -> f64 {
        match *self {
            Self::Fixed(longitude) => longitude,
            Self::Linear {
                epoch,
                longitude,
                degrees_per_day,
            } => {
                let days = (instant - epoch).num_milliseconds() as f64 / 86_400_000.0;
                normalize_degrees(longitude + degrees_per_day * days)
            }
        }
    }
}

/// In-memory ephemeris.
///
/// Lookup order: an exact (instant, body) entry, then the body's track.
/// Anything else is `OutOfRange`. Uses BTreeMap for deterministic iteration.
#[derive(Debug, Clone, Default)]
pub struct TableEphemeris {
    /// Readings at exact instants, keyed by (unix millis, body).
    exact: BTreeMap<(i64, Body), f64>,
    /// Fallback track per body.
    tracks: BTreeMap<Body, Track>,
}

impl TableEphemeris {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reading at an exact instant.
    pub fn insert(&mut self, instant: DateTime<Utc>, body: Body, longitude: f64) {
        self.exact.insert((instant.timestamp_millis(), body), longitude);
    }

    /// Set the track used when no exact reading exists.
    pub fn set_track(&mut self, body: Body, track: Track) {
        self.tracks.insert(body, track);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_reading(mut self, instant: DateTime<Utc>, body: Body, longitude: f64) -> Self {
        self.insert(instant, body, longitude);
        self
    }

    /// Builder form of [`set_track`](Self::set_track).
    pub fn with_track(mut self, body: Body, track: Track) -> Self {
        self.set_track(body, track);
        self
    }

    /// Get number of exact readings.
    pub fn num_readings(&self) -> usize {
        self.exact.len()
    }

    fn lookup(&self, instant: DateTime<Utc>, body: Body) -> Option<f64> {
        self.exact
            .get(&(instant.timestamp_millis(), body))
            .copied()
            .or_else(|| self.tracks.get(&body).map(|t| t.at(instant)))
    }
}

#[async_trait]
impl EphemerisProvider for TableEphemeris {
    async fn longitude(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError> {
        let direct = self.lookup(instant, body);
        let mirrored = || {
            body.mirror_of()
                .and_then(|m| self.lookup(instant, m))
                .map(|lon| normalize_degrees(lon + 180.0))
        };
        direct
            .or_else(mirrored)
            .map(Reading::exact)
            .ok_or(EphemerisError::OutOfRange { body, instant })
    }

    fn name(&self) -> &str {
        "table"
    }
}
