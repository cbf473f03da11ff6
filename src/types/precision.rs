//! Precision annotation carried from ephemeris readings up to the report.

use serde::{Deserialize, Serialize};

/// Whether a value was computed at full precision.
///
/// `Degraded` is never an error. It records why a lower-precision path was
/// taken so callers can decide to warn, log, or reject.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Precision {
    /// Computed by the primary path.
    #[default]
    Exact,
    /// A fallback path was used somewhere along the way.
    Degraded {
        /// One entry per distinct fallback, sorted and deduplicated.
        reasons: Vec<String>,
    },
}

impl Precision {
    /// A degraded precision with a single reason.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            reasons: vec![reason.into()],
        }
    }

    /// Whether any fallback was taken.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Reasons for degradation (empty when exact).
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Exact => &[],
            Self::Degraded { reasons } => reasons,
        }
    }

    /// Combine two annotations. Degradation is sticky.
    pub fn merge(self, other: Precision) -> Precision {
        match (self, other) {
            (Self::Exact, Self::Exact) => Self::Exact,
            (a, b) => {
                let mut reasons: Vec<String> = a
                    .reasons()
                    .iter()
                    .chain(b.reasons().iter())
                    .cloned()
                    .collect();
                reasons.sort();
                reasons.dedup();
                Self::Degraded { reasons }
            }
        }
    }
}

impl FromIterator<Precision> for Precision {
    fn from_iter<I: IntoIterator<Item = Precision>>(iter: I) -> Self {
        iter.into_iter().fold(Precision::Exact, Precision::merge)
    }
}
