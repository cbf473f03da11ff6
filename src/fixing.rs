//! Fixing-state calculation.
//!
//! For a focal activation (body, gate, line) on one side:
//!
//! ```text
//! seed     = rule(body, gate, line)
//! same     = OR rule(p, gate, line) for every activation p on the same side
//!            sitting in a harmonic partner of gate
//! opposite = the same OR over the other side
//! state    = seed | same | opposite
//! cross_end = opposite has a bit not in (seed | same)
//! ```
//!
//! Every step is a bitwise OR over a set, so neither partner order nor
//! activation order can change the result.

use crate::tables::{FixingRules, PartnerPolicy, ReferenceTables};
use crate::types::{
    Activation, Chart, ChartFixing, ChartSide, FixingAnnotation, FixingState, Gate, Side,
};

/// OR of the rules that `contributors` sitting in one of `partners` hold
/// for the focal gate and line.
pub fn harmonic_state<'b>(
    rules: &FixingRules,
    focal: &Activation,
    partners: &[Gate],
    contributors: impl IntoIterator<Item = &'b Activation>,
) -> FixingState {
    contributors
        .into_iter()
        .filter(|other| partners.contains(&other.gate))
        .fold(FixingState::NONE, |state, other| {
            state | rules.state(other.body, focal.gate, focal.line)
        })
}

/// Combine the direct rule with same-side and opposite-side contributions.
pub fn combine(focal: &Activation, seed: FixingState, same: FixingState, opposite: FixingState) -> FixingAnnotation {
    let local = seed | same;
    FixingAnnotation {
        activation: *focal,
        state: local | opposite,
        cross_end: !opposite.difference(local).is_empty(),
    }
}

/// Computes fixing annotations.
pub struct FixingCalculator<'a> {
    tables: &'a ReferenceTables,
    partner_policy: PartnerPolicy,
}

impl<'a> FixingCalculator<'a> {
    /// Create a calculator with an explicit partner policy.
    pub fn new(tables: &'a ReferenceTables, partner_policy: PartnerPolicy) -> Self {
        Self {
            tables,
            partner_policy,
        }
    }

    /// Rules contributed by activations on `side` sitting in a partner gate
    /// of the focal activation.
    fn harmonic_contribution(&self, focal: &Activation, side: &ChartSide) -> FixingState {
        let partners = self.tables.partners().resolve(focal.gate, self.partner_policy);
        harmonic_state(self.tables.fixing_rules(), focal, &partners, side.iter())
    }

    /// Annotate one activation given its own side and the opposite side.
    pub fn annotate(&self, focal: &Activation, own: &ChartSide, opposite: &ChartSide) -> FixingAnnotation {
        let seed = self
            .tables
            .fixing_rules()
            .state(focal.body, focal.gate, focal.line);
        combine(
            focal,
            seed,
            self.harmonic_contribution(focal, own),
            self.harmonic_contribution(focal, opposite),
        )
    }

    /// Annotate every activation on one side of a chart, in body order.
    pub fn annotate_side(&self, chart: &Chart, side: Side) -> Vec<FixingAnnotation> {
        let own = chart.side(side);
        let opposite = chart.side(side.opposite());
        own.iter().map(|a| self.annotate(a, own, opposite)).collect()
    }

    /// Annotate both sides.
    pub fn annotate_chart(&self, chart: &Chart) -> ChartFixing {
        ChartFixing {
            personality: self.annotate_side(chart, Side::Personality),
            design: self.annotate_side(chart, Side::Design),
        }
    }
}
