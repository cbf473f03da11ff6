//! Chart sides and the assembled chart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::activation::{Activation, Gate};
use super::body::Body;
use super::error::ConsistencyError;
use super::precision::Precision;

/// Which instant a chart side was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Birth instant (conscious, "black").
    Personality,
    /// Solved design instant (unconscious, "red").
    Design,
}

impl Side {
    /// The other side.
    pub fn opposite(&self) -> Side {
        match self {
            Self::Personality => Self::Design,
            Self::Design => Self::Personality,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Personality => write!(f, "personality"),
            Self::Design => write!(f, "design"),
        }
    }
}

/// All 13 activations computed for one instant.
///
/// Backed by a `BTreeMap` so iteration is in [`Body`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Body, Activation>", into = "BTreeMap<Body, Activation>")]
pub struct ChartSide {
    activations: BTreeMap<Body, Activation>,
}

impl ChartSide {
    /// Build a side from activations. Every body must be present exactly once.
    pub fn from_activations(
        activations: impl IntoIterator<Item = Activation>,
    ) -> Result<Self, ConsistencyError> {
        let activations: BTreeMap<Body, Activation> =
            activations.into_iter().map(|a| (a.body, a)).collect();
        Self::try_from(activations)
    }

    /// The activation for a body.
    pub fn get(&self, body: Body) -> &Activation {
        // Every body is present: enforced at construction.
        &self.activations[&body]
    }

    /// Iterate activations in body order.
    pub fn iter(&self) -> impl Iterator<Item = &Activation> {
        self.activations.values()
    }

    /// Distinct gates activated on this side.
    pub fn gates(&self) -> BTreeSet<Gate> {
        self.activations.values().map(|a| a.gate).collect()
    }

    /// Activations sitting in a given gate.
    pub fn in_gate(&self, gate: Gate) -> impl Iterator<Item = &Activation> {
        self.activations.values().filter(move |a| a.gate == gate)
    }
}

impl TryFrom<BTreeMap<Body, Activation>> for ChartSide {
    type Error = ConsistencyError;

    fn try_from(activations: BTreeMap<Body, Activation>) -> Result<Self, Self::Error> {
        if let Some(missing) = Body::ALL.iter().find(|b| !activations.contains_key(b)) {
            return Err(ConsistencyError::MissingBody(missing.to_string()));
        }
        if let Some((key, a)) = activations.iter().find(|(k, a)| **k != a.body) {
            return Err(ConsistencyError::MissingBody(format!(
                "{} (keyed as {})",
                a.body, key
            )));
        }
        Ok(Self { activations })
    }
}

impl From<ChartSide> for BTreeMap<Body, Activation> {
    fn from(side: ChartSide) -> Self {
        side.activations
    }
}

/// Personality and design sides for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Activations at the birth instant.
    pub personality: ChartSide,
    /// Activations at the design instant.
    pub design: ChartSide,
    /// Birth instant (UTC).
    pub birth: DateTime<Utc>,
    /// Solved design instant (UTC).
    pub design_instant: DateTime<Utc>,
    /// Combined precision of every reading and the solver.
    pub precision: Precision,
}

impl Chart {
    /// Assemble a chart from two sides.
    pub fn new(
        personality: ChartSide,
        design: ChartSide,
        birth: DateTime<Utc>,
        design_instant: DateTime<Utc>,
        precision: Precision,
    ) -> Self {
        Self {
            personality,
            design,
            birth,
            design_instant,
            precision,
        }
    }

    /// One side of the chart.
    pub fn side(&self, side: Side) -> &ChartSide {
        match side {
            Side::Personality => &self.personality,
            Side::Design => &self.design,
        }
    }

    /// Union of gates activated on both sides.
    pub fn activated_gates(&self) -> BTreeSet<Gate> {
        let mut gates = self.personality.gates();
        gates.extend(self.design.gates());
        gates
    }
}
