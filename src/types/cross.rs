//! Incarnation cross classification result.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::activation::{Gate, Line};

/// Angle of an incarnation cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossAngle {
    /// Right angle (personal destiny).
    RightAngle,
    /// Left angle (transpersonal karma).
    LeftAngle,
    /// Juxtaposition (fixed fate).
    Juxtaposition,
}

impl CrossAngle {
    /// Infer the angle from the personality and design Sun lines.
    ///
    /// Both lower -> right angle, both upper -> left angle, mixed ->
    /// juxtaposition.
    pub fn from_lines(personality_sun: Line, design_sun: Line) -> Self {
        match (personality_sun.is_lower(), design_sun.is_lower()) {
            (true, true) => Self::RightAngle,
            (false, false) => Self::LeftAngle,
            _ => Self::Juxtaposition,
        }
    }

    /// Cross number for this angle in the given quarter (1-4).
    pub fn number_in_quarter(&self, quarter: u8) -> Option<u8> {
        match self {
            Self::RightAngle => Some(quarter),
            Self::LeftAngle => Some(if quarter == 1 || quarter == 3 { 1 } else { 2 }),
            Self::Juxtaposition => None,
        }
    }

    /// Stable display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RightAngle => "Right Angle",
            Self::LeftAngle => "Left Angle",
            Self::Juxtaposition => "Juxtaposition",
        }
    }
}

impl fmt::Display for CrossAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-gate cross signature, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CrossKey {
    /// Personality Sun gate.
    pub personality_sun: Gate,
    /// Personality Earth gate.
    pub personality_earth: Gate,
    /// Design Sun gate.
    pub design_sun: Gate,
    /// Design Earth gate.
    pub design_earth: Gate,
}

impl CrossKey {
    /// The key as a gate array.
    pub fn gates(&self) -> [Gate; 4] {
        [
            self.personality_sun,
            self.personality_earth,
            self.design_sun,
            self.design_earth,
        ]
    }
}

impl fmt::Display for CrossKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} | {}/{}",
            self.personality_sun, self.personality_earth, self.design_sun, self.design_earth
        )
    }
}

/// A classified incarnation cross.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncarnationCross {
    /// Gate signature.
    pub key: CrossKey,
    /// Angle.
    pub angle: CrossAngle,
    /// Quarter (1-4) containing the personality Sun gate.
    pub quarter: u8,
    /// Cross number, absent for juxtapositions.
    pub number: Option<u8>,
    /// Display name.
    pub name: String,
    /// True when the signature was found in the reference table.
    pub matched: bool,
}

impl fmt::Display for IncarnationCross {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{} {} ({})", self.name, n, self.key),
            None => write!(f, "{} ({})", self.name, self.key),
        }
    }
}
