//! Classification results produced by the analyzer.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::activation::{Gate, Line};
use super::center::{Center, Channel};

/// Energy type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodygraphType {
    /// No defined centers.
    Reflector,
    /// Sacral defined with a motor connected to the throat.
    ManifestingGenerator,
    /// Sacral defined, no motor to throat.
    Generator,
    /// Sacral open, motor connected to the throat.
    Manifestor,
    /// Everything else.
    Projector,
}

impl fmt::Display for BodygraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reflector => "Reflector",
            Self::ManifestingGenerator => "Manifesting Generator",
            Self::Generator => "Generator",
            Self::Manifestor => "Manifestor",
            Self::Projector => "Projector",
        };
        f.write_str(s)
    }
}

/// Inner authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    /// Solar plexus defined.
    Emotional,
    /// Sacral defined, solar plexus open.
    Sacral,
    /// Spleen is the highest defined awareness center.
    Splenic,
    /// Ego connected to the throat or to the G.
    EgoProjected,
    /// G connected to the throat.
    SelfProjected,
    /// Ajna connected to the throat.
    Environmental,
    /// No defined centers.
    Lunar,
    /// None of the above applies.
    None,
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Emotional => "Emotional",
            Self::Sacral => "Sacral",
            Self::Splenic => "Splenic",
            Self::EgoProjected => "Ego Projected",
            Self::SelfProjected => "Self Projected",
            Self::Environmental => "Environmental",
            Self::Lunar => "Lunar",
            Self::None => "None",
        };
        f.write_str(s)
    }
}

/// Profile: personality Sun line over design Sun line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    /// Personality Sun line.
    pub personality: Line,
    /// Design Sun line.
    pub design: Line,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.personality, self.design)
    }
}

/// How many disconnected groups the defined centers form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Definition {
    /// No defined centers.
    NoDefinition,
    /// One connected group.
    Single,
    /// Two groups.
    Split,
    /// Three groups.
    TripleSplit,
    /// Four or more groups.
    QuadrupleSplit,
}

impl Definition {
    /// Classify a connected-component count.
    pub fn from_components(count: usize) -> Self {
        match count {
            0 => Self::NoDefinition,
            1 => Self::Single,
            2 => Self::Split,
            3 => Self::TripleSplit,
            _ => Self::QuadrupleSplit,
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoDefinition => "No Definition",
            Self::Single => "Single Definition",
            Self::Split => "Split Definition",
            Self::TripleSplit => "Triple Split Definition",
            Self::QuadrupleSplit => "Quadruple Split Definition",
        };
        f.write_str(s)
    }
}

/// Everything the analyzer derives from a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodygraphAnalysis {
    /// Energy type.
    pub bodygraph_type: BodygraphType,
    /// Inner authority.
    pub authority: Authority,
    /// Profile.
    pub profile: Profile,
    /// Definition.
    pub definition: Definition,
    /// Present channels, sorted.
    pub channels: Vec<Channel>,
    /// Defined centers, sorted.
    pub defined_centers: Vec<Center>,
    /// Gates activated on either side, sorted.
    pub activated_gates: Vec<Gate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_from_components() {
        assert_eq!(Definition::from_components(0), Definition::NoDefinition);
        assert_eq!(Definition::from_components(2), Definition::Split);
        assert_eq!(Definition::from_components(4), Definition::QuadrupleSplit);
        assert_eq!(Definition::from_components(7), Definition::QuadrupleSplit);
    }

    #[test]
    fn test_profile_display() {
        let p = Profile {
            personality: Line::new(4).unwrap(),
            design: Line::new(6).unwrap(),
        };
        assert_eq!(p.to_string(), "4/6");
    }
}
