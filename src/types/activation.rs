//! Gate, line and activation types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::body::Body;
use super::error::ValidationError;

/// One of the 64 gates. Always in 1..=64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Gate(u8);

impl Gate {
    /// Number of gates on the wheel.
    pub const COUNT: usize = 64;

    /// Create a gate, rejecting numbers outside 1..=64.
    pub fn new(number: u8) -> Result<Self, ValidationError> {
        if (1..=64).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ValidationError::GateOutOfRange(number))
        }
    }

    /// The gate number.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Iterate all 64 gates in numeric order.
    pub fn all() -> impl Iterator<Item = Gate> {
        (1..=64u8).map(Gate)
    }

    /// Construct from a literal known to be in range. Used by static tables.
    pub(crate) const fn from_table(number: u8) -> Self {
        Self(number)
    }
}

impl TryFrom<u8> for Gate {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Gate> for u8 {
    fn from(gate: Gate) -> Self {
        gate.0
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the six lines within a gate. Always in 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Line(u8);

impl Line {
    /// Lines per gate.
    pub const COUNT: usize = 6;

    /// Create a line, rejecting numbers outside 1..=6.
    pub fn new(number: u8) -> Result<Self, ValidationError> {
        if (1..=6).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ValidationError::LineOutOfRange(number))
        }
    }

    /// The line number.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Clamp an arbitrary computed index into 1..=6.
    pub(crate) fn clamped(raw: i64) -> Self {
        Self(raw.clamp(1, 6) as u8)
    }

    /// Lines 1-3 (the lower trigram).
    pub fn is_lower(&self) -> bool {
        self.0 <= 3
    }
}

impl TryFrom<u8> for Line {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Line> for u8 {
    fn from(line: Line) -> Self {
        line.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A body's position expressed on the gate wheel.
///
/// Produced once per (body, instant) and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    /// The body that produced this activation.
    pub body: Body,
    /// Ecliptic longitude in degrees, normalized to [0, 360).
    pub longitude: f64,
    /// Gate on the wheel.
    pub gate: Gate,
    /// Line within the gate.
    pub line: Line,
}

impl Activation {
    /// Create an activation.
    pub fn new(body: Body, longitude: f64, gate: Gate, line: Line) -> Self {
        Self {
            body,
            longitude,
            gate,
            line,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.body, self.gate, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_bounds() {
        assert!(Gate::new(0).is_err());
        assert!(Gate::new(1).is_ok());
        assert!(Gate::new(64).is_ok());
        assert_eq!(Gate::new(65), Err(ValidationError::GateOutOfRange(65)));
        assert_eq!(Gate::all().count(), Gate::COUNT);
    }

    #[test]
    fn test_line_bounds_and_clamp() {
        assert!(Line::new(0).is_err());
        assert!(Line::new(6).is_ok());
        assert_eq!(Line::clamped(7).get(), 6);
        assert_eq!(Line::clamped(0).get(), 1);
        assert!(Line::new(3).unwrap().is_lower());
        assert!(!Line::new(4).unwrap().is_lower());
    }

    #[test]
    fn test_gate_deserialize_rejects_out_of_range() {
        let ok: Gate = serde_json::from_str("37").unwrap();
        assert_eq!(ok.get(), 37);
        assert!(serde_json::from_str::<Gate>("99").is_err());
    }

    #[test]
    fn test_activation_display() {
        let a = Activation::new(
            Body::Neptune,
            123.4,
            Gate::new(37).unwrap(),
            Line::new(4).unwrap(),
        );
        assert_eq!(a.to_string(), "Neptune 37.4");
    }
}
