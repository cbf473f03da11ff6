//! Fixing-state bitmask and per-activation annotation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use super::activation::Activation;

/// Bitmask over {Exalted, Detriment}. Juxtaposed is both bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixingState(u8);

impl FixingState {
    /// No fixing.
    pub const NONE: FixingState = FixingState(0);
    /// Exalted.
    pub const EXALTED: FixingState = FixingState(1);
    /// Detriment.
    pub const DETRIMENT: FixingState = FixingState(2);
    /// Exalted and in detriment at once.
    pub const JUXTAPOSED: FixingState = FixingState(3);

    /// Raw bits.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping anything above the two defined bits.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11)
    }

    /// No bits set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Every bit of `other` is set in `self`.
    pub fn contains(&self, other: FixingState) -> bool {
        self.0 & other.0 == other.0
    }

    /// Bits in `self` that are not in `other`.
    pub fn difference(&self, other: FixingState) -> FixingState {
        Self(self.0 & !other.0)
    }

    /// Glyph used on rendered charts.
    pub fn symbol(&self) -> &'static str {
        match self.0 {
            1 => "▲",
            2 => "▼",
            3 => "✲",
            _ => "",
        }
    }

    /// Lowercase name used in reference data.
    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "exalted",
            2 => "detriment",
            3 => "juxtaposed",
            _ => "none",
        }
    }

    /// Parse a reference-data name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Some(Self::NONE),
            "exalted" => Some(Self::EXALTED),
            "detriment" => Some(Self::DETRIMENT),
            "juxtaposed" => Some(Self::JUXTAPOSED),
            _ => None,
        }
    }
}

impl BitOr for FixingState {
    type Output = FixingState;

    fn bitor(self, rhs: FixingState) -> FixingState {
        FixingState(self.0 | rhs.0)
    }
}

impl BitOrAssign for FixingState {
    fn bitor_assign(&mut self, rhs: FixingState) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for FixingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixing result for one activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixingAnnotation {
    /// The annotated activation.
    pub activation: Activation,
    /// Aggregated state.
    pub state: FixingState,
    /// Some bit came only from the opposite chart side. Diagnostic.
    pub cross_end: bool,
}

/// Fixing annotations for both chart sides, each in body order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFixing {
    /// Personality side.
    pub personality: Vec<FixingAnnotation>,
    /// Design side.
    pub design: Vec<FixingAnnotation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_reaches_juxtaposed() {
        let mut s = FixingState::NONE;
        s |= FixingState::EXALTED;
        assert_eq!(s.symbol(), "▲");
        s |= FixingState::DETRIMENT;
        assert_eq!(s, FixingState::JUXTAPOSED);
        assert_eq!(s.symbol(), "✲");
        assert!(s.contains(FixingState::EXALTED));
    }

    #[test]
    fn test_difference() {
        assert_eq!(
            FixingState::JUXTAPOSED.difference(FixingState::EXALTED),
            FixingState::DETRIMENT
        );
        assert!(FixingState::EXALTED.difference(FixingState::JUXTAPOSED).is_empty());
    }

    #[test]
    fn test_names() {
        for s in [
            FixingState::NONE,
            FixingState::EXALTED,
            FixingState::DETRIMENT,
            FixingState::JUXTAPOSED,
        ] {
            assert_eq!(FixingState::from_name(s.name()), Some(s));
        }
        assert_eq!(FixingState::from_name("Exalted"), Some(FixingState::EXALTED));
        assert_eq!(FixingState::from_name("sideways"), None);
    }
}
