//! Celestial bodies tracked on each chart side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A body whose longitude produces one activation per chart side.
///
/// Ordering follows the conventional bodygraph listing (Sun, Earth, nodes,
/// then the planets outward), which is also the iteration order of
/// [`ChartSide`](super::ChartSide).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Body {
    /// The Sun.
    Sun,
    /// Earth, always opposite the Sun.
    Earth,
    /// The Moon.
    Moon,
    /// Lunar north node (true node).
    NorthNode,
    /// Lunar south node, always opposite the north node.
    SouthNode,
    /// Mercury.
    Mercury,
    /// Venus.
    Venus,
    /// Mars.
    Mars,
    /// Jupiter.
    Jupiter,
    /// Saturn.
    Saturn,
    /// Uranus.
    Uranus,
    /// Neptune.
    Neptune,
    /// Pluto.
    Pluto,
}

impl Body {
    /// All 13 bodies, in chart order.
    pub const ALL: [Body; 13] = [
        Body::Sun,
        Body::Earth,
        Body::Moon,
        Body::NorthNode,
        Body::SouthNode,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// The 11 bodies an ephemeris provider is asked for.
    ///
    /// Earth and the south node are derived from the Sun and north node.
    pub const QUERIED: [Body; 11] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::NorthNode,
    ];

    /// If this body is derived, the body it mirrors (opposite by 180°).
    pub fn mirror_of(&self) -> Option<Body> {
        match self {
            Self::Earth => Some(Self::Sun),
            Self::SouthNode => Some(Self::NorthNode),
            _ => None,
        }
    }

    /// Whether the provider is queried directly for this body.
    pub fn is_queried(&self) -> bool {
        self.mirror_of().is_none()
    }

    /// Stable name used in tables and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Earth => "Earth",
            Self::Moon => "Moon",
            Self::NorthNode => "NorthNode",
            Self::SouthNode => "SouthNode",
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
            Self::Uranus => "Uranus",
            Self::Neptune => "Neptune",
            Self::Pluto => "Pluto",
        }
    }

    /// Parse a body name (case-insensitive, `_` and spaces ignored).
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != ' ')
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.as_str().to_lowercase() == key)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queried_and_derived_partition_all() {
        let queried = Body::ALL.iter().filter(|b| b.is_queried()).count();
        assert_eq!(queried, Body::QUERIED.len());
        assert_eq!(Body::ALL.len() - queried, 2);
        assert!(Body::QUERIED.iter().all(|b| b.is_queried()));
    }

    #[test]
    fn test_from_str_round_trips_names() {
        for body in Body::ALL {
            assert_eq!(Body::from_str(body.as_str()), Some(body));
        }
        assert_eq!(Body::from_str("north_node"), Some(Body::NorthNode));
        assert_eq!(Body::from_str("south node"), Some(Body::SouthNode));
        assert_eq!(Body::from_str("vulcan"), None);
    }
}
