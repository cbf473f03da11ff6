//! Longitude to (gate, line) mapping.
//!
//! The wheel is 64 equal arcs of 5.625°, each split into six lines of
//! 0.9375°, rotated by a calibration offset. The 384 slots partition
//! [0, 360) with no gaps and no overlaps.

use crate::tables::GateWheel;
use crate::types::{Activation, Body, Gate, Line, ValidationError};

/// Arc covered by one gate.
pub const DEGREES_PER_GATE: f64 = 360.0 / 64.0;

/// Arc covered by one line.
pub const DEGREES_PER_LINE: f64 = DEGREES_PER_GATE / 6.0;

/// Normalize any finite angle to [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Maps ecliptic longitudes onto the gate wheel.
#[derive(Debug, Clone, Copy)]
pub struct ActivationMapper<'a> {
    wheel: &'a GateWheel,
    offset_deg: f64,
}

impl<'a> ActivationMapper<'a> {
    /// Create a mapper for a wheel and calibration offset.
    pub fn new(wheel: &'a GateWheel, offset_deg: f64) -> Self {
        Self { wheel, offset_deg }
    }

    /// Longitude measured from the wheel's zero point, in [0, 360).
    pub fn adjusted(&self, longitude: f64) -> Result<f64, ValidationError> {
        if !longitude.is_finite() {
            return Err(ValidationError::NonFiniteLongitude(longitude));
        }
        Ok(normalize_degrees(longitude - self.offset_deg))
    }

    /// Map a longitude to its gate and line.
    pub fn map(&self, longitude: f64) -> Result<(Gate, Line), ValidationError> {
        let adjusted = self.adjusted(longitude)?;

        let index = ((adjusted / DEGREES_PER_GATE).floor() as usize).min(Gate::COUNT - 1);
        let gate = self.wheel.gate_at(index);

        let within = adjusted - index as f64 * DEGREES_PER_GATE;
        let line = Line::clamped((within / DEGREES_PER_LINE).floor() as i64 + 1);

        Ok((gate, line))
    }

    /// Map a body's longitude to an activation.
    pub fn activation(&self, body: Body, longitude: f64) -> Result<Activation, ValidationError> {
        let (gate, line) = self.map(longitude)?;
        Ok(Activation::new(body, normalize_degrees(longitude), gate, line))
    }

    /// Ecliptic arc covered by a (gate, line) slot.
    ///
    /// `start` is in [0, 360); `end` is `start + DEGREES_PER_LINE` and may
    /// exceed 360 for the slot that straddles the zero point.
    pub fn slot_bounds(&self, gate: Gate, line: Line) -> (f64, f64) {
        let index = self.wheel.position(gate) as f64;
        let start = normalize_degrees(
            self.offset_deg + index * DEGREES_PER_GATE + (line.get() - 1) as f64 * DEGREES_PER_LINE,
        );
        (start, start + DEGREES_PER_LINE)
    }
}
