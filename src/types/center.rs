//! Centers and channels.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::activation::Gate;

/// One of the nine centers of the bodygraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Center {
    /// Head (pressure).
    Head,
    /// Ajna (awareness).
    Ajna,
    /// Throat (manifestation).
    Throat,
    /// G center (identity).
    G,
    /// Ego, also called Heart (motor).
    Ego,
    /// Sacral (motor).
    Sacral,
    /// Solar plexus (motor, awareness).
    SolarPlexus,
    /// Spleen (awareness).
    Spleen,
    /// Root (pressure, motor).
    Root,
}

impl Center {
    /// All nine centers.
    pub const ALL: [Center; 9] = [
        Center::Head,
        Center::Ajna,
        Center::Throat,
        Center::G,
        Center::Ego,
        Center::Sacral,
        Center::SolarPlexus,
        Center::Spleen,
        Center::Root,
    ];

    /// Motor centers: a channel from one of these to the throat makes the
    /// subject able to manifest.
    pub fn is_motor(&self) -> bool {
        matches!(
            self,
            Self::Sacral | Self::Ego | Self::SolarPlexus | Self::Root
        )
    }

    /// Dense index in 0..9, for union-find.
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Stable display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "Head",
            Self::Ajna => "Ajna",
            Self::Throat => "Throat",
            Self::G => "G",
            Self::Ego => "Ego",
            Self::Sacral => "Sacral",
            Self::SolarPlexus => "SolarPlexus",
            Self::Spleen => "Spleen",
            Self::Root => "Root",
        }
    }
}

impl fmt::Display for Center {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unordered gate pair, stored canonically as (low, high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Channel {
    low: Gate,
    high: Gate,
}

impl Channel {
    /// Create a channel from two gates in either order.
    pub fn new(a: Gate, b: Gate) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Lower gate number.
    pub fn low(&self) -> Gate {
        self.low
    }

    /// Higher gate number.
    pub fn high(&self) -> Gate {
        self.high
    }

    /// Whether this channel has `gate` at either end.
    pub fn touches(&self, gate: Gate) -> bool {
        self.low == gate || self.high == gate
    }

    /// The gate at the other end from `gate`.
    pub fn other(&self, gate: Gate) -> Option<Gate> {
        if self.low == gate {
            Some(self.high)
        } else if self.high == gate {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}
