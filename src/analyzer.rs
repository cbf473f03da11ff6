//! Bodygraph analysis: channels, centers, type, authority, profile and
//! definition.
//!
//! Center relationships come from the channel table. The only exception is
//! the two-hop motor-to-throat paths, which use fixed channel lists: 10-34
//! and 34-57 join the same centers but do not carry a motor through.

use std::collections::BTreeSet;

use crate::tables::{PartnerPolicy, ReferenceTables};
use crate::types::{
    Authority, BodygraphAnalysis, BodygraphType, Body, Center, Channel, Chart, ConsistencyError,
    Definition, Gate, Profile,
};

/// Sacral to G channels that carry the sacral motor onward.
const SACRAL_TO_G: [(u8, u8); 3] = [(2, 14), (5, 15), (29, 46)];
/// G to throat channels.
const G_TO_THROAT: [(u8, u8); 4] = [(1, 8), (7, 31), (10, 20), (13, 33)];
/// Spleen to throat channels.
const SPLEEN_TO_THROAT: [(u8, u8); 2] = [(16, 48), (20, 57)];
/// Sacral to spleen channels that carry the sacral motor onward.
const SACRAL_TO_SPLEEN: [(u8, u8); 1] = [(27, 50)];
/// Root to spleen channels.
const ROOT_TO_SPLEEN: [(u8, u8); 3] = [(18, 58), (28, 38), (32, 54)];

fn any_listed(channels: &BTreeSet<Channel>, listed: &[(u8, u8)]) -> bool {
    channels
        .iter()
        .any(|c| listed.contains(&(c.low().get(), c.high().get())))
}

/// Union-find over the nine centers.
#[derive(Debug, Clone)]
struct CenterSets {
    parent: [usize; 9],
}

impl CenterSets {
    fn new() -> Self {
        Self {
            parent: [0, 1, 2, 3, 4, 5, 6, 7, 8],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller root wins so the structure is independent of edge order.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Number of connected groups formed by center pairs.
///
/// Only centers that appear in some pair count.
pub fn count_components(pairs: impl IntoIterator<Item = (Center, Center)>) -> usize {
    let mut sets = CenterSets::new();
    let mut touched = BTreeSet::new();
    for (a, b) in pairs {
        sets.union(a.index(), b.index());
        touched.insert(a.index());
        touched.insert(b.index());
    }
    touched
        .into_iter()
        .map(|c| sets.find(c))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Derives a [`BodygraphAnalysis`] from a chart.
pub struct BodygraphAnalyzer<'a> {
    tables: &'a ReferenceTables,
    partner_policy: PartnerPolicy,
}

impl<'a> BodygraphAnalyzer<'a> {
    /// Create an analyzer with an explicit partner policy.
    pub fn new(tables: &'a ReferenceTables, partner_policy: PartnerPolicy) -> Self {
        Self {
            tables,
            partner_policy,
        }
    }

    /// Channels completed by a set of activated gates.
    pub fn channels(&self, gates: &BTreeSet<Gate>) -> BTreeSet<Channel> {
        let partners = self.tables.partners();
        gates
            .iter()
            .flat_map(|&gate| {
                partners
                    .resolve(gate, self.partner_policy)
                    .into_iter()
                    .filter(|h| gates.contains(h))
                    .map(move |h| Channel::new(gate, h))
            })
            .collect()
    }

    /// Analyze a chart.
    pub fn analyze(&self, chart: &Chart) -> Result<BodygraphAnalysis, ConsistencyError> {
        let gates = chart.activated_gates();
        let channels = self.channels(&gates);

        let mut ends = Vec::with_capacity(channels.len());
        for &channel in &channels {
            let [a, b] = self.tables.channels().centers(channel)?;
            ends.push((a, b));
        }

        let defined: BTreeSet<Center> = ends.iter().flat_map(|&(a, b)| [a, b]).collect();

        let bodygraph_type = self.classify_type(&channels, &defined);
        let authority = self.classify_authority(&channels, &defined);
        let definition = Definition::from_components(count_components(ends.iter().copied()));

        let profile = Profile {
            personality: chart.personality.get(Body::Sun).line,
            design: chart.design.get(Body::Sun).line,
        };

        Ok(BodygraphAnalysis {
            bodygraph_type,
            authority,
            profile,
            definition,
            channels: channels.into_iter().collect(),
            defined_centers: defined.into_iter().collect(),
            activated_gates: gates.into_iter().collect(),
        })
    }

    fn any_between(&self, channels: &BTreeSet<Channel>, a: Center, b: Center) -> bool {
        self.tables
            .channels()
            .between(a, b)
            .iter()
            .any(|c| channels.contains(c))
    }

    /// Whether a motor center reaches the throat.
    ///
    /// Direct motor-throat channel, or sacral-G plus G-throat, or
    /// spleen-throat plus sacral-spleen or root-spleen. The two-hop paths
    /// only count the listed channels.
    pub fn motor_to_throat(&self, channels: &BTreeSet<Channel>) -> bool {
        let direct = Center::ALL
            .iter()
            .filter(|c| c.is_motor())
            .any(|&m| self.any_between(channels, m, Center::Throat));

        let via_g = any_listed(channels, &SACRAL_TO_G) && any_listed(channels, &G_TO_THROAT);

        let via_spleen = any_listed(channels, &SPLEEN_TO_THROAT)
            && (any_listed(channels, &SACRAL_TO_SPLEEN) || any_listed(channels, &ROOT_TO_SPLEEN));

        direct || via_g || via_spleen
    }

    fn classify_type(&self, channels: &BTreeSet<Channel>, defined: &BTreeSet<Center>) -> BodygraphType {
        if defined.is_empty() {
            return BodygraphType::Reflector;
        }
        let sacral = defined.contains(&Center::Sacral);
        match (sacral, self.motor_to_throat(channels)) {
            (true, true) => BodygraphType::ManifestingGenerator,
            (true, false) => BodygraphType::Generator,
            (false, true) => BodygraphType::Manifestor,
            (false, false) => BodygraphType::Projector,
        }
    }

    fn classify_authority(&self, channels: &BTreeSet<Channel>, defined: &BTreeSet<Center>) -> Authority {
        if defined.contains(&Center::SolarPlexus) {
            Authority::Emotional
        } else if defined.contains(&Center::Sacral) {
            Authority::Sacral
        } else if defined.contains(&Center::Spleen) {
            Authority::Splenic
        } else if self.any_between(channels, Center::Ego, Center::Throat)
            || self.any_between(channels, Center::Ego, Center::G)
        {
            Authority::EgoProjected
        } else if self.any_between(channels, Center::G, Center::Throat) {
            Authority::SelfProjected
        } else if defined.contains(&Center::Ajna) && self.any_between(channels, Center::Ajna, Center::Throat) {
            Authority::Environmental
        } else if defined.is_empty() {
            Authority::Lunar
        } else {
            Authority::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Activation, ChartSide, Line, Precision};
    use chrono::Utc;

    /// A chart whose activations sit in `p_gates` (personality) and
    /// `d_gates` (design). Remaining bodies repeat the first listed gate.
    fn chart(p_gates: &[u8], d_gates: &[u8], p_sun_line: u8, d_sun_line: u8) -> Chart {
        let side = |gates: &[u8], sun_line: u8| {
            let acts = Body::ALL.iter().enumerate().map(|(i, &body)| {
                let gate = gates.get(i).copied().unwrap_or(gates.first().copied().unwrap_or(1));
                let line = if body == Body::Sun { sun_line } else { 1 };
                Activation::new(body, 0.0, Gate::new(gate).unwrap(), Line::new(line).unwrap())
            });
            ChartSide::from_activations(acts).unwrap()
        };
        let now = Utc::now();
        Chart::new(
            side(p_gates, p_sun_line),
            side(d_gates, d_sun_line),
            now,
            now,
            Precision::Exact,
        )
    }

    fn analyze(p: &[u8], d: &[u8]) -> BodygraphAnalysis {
        let tables = ReferenceTables::builtin().unwrap();
        BodygraphAnalyzer::new(&tables, PartnerPolicy::AnyMatch)
            .analyze(&chart(p, d, 1, 3))
            .unwrap()
    }

    fn names(channels: &[Channel]) -> Vec<String> {
        channels.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_no_channels_is_reflector() {
        let a = analyze(&[1], &[2]);
        assert!(a.channels.is_empty());
        assert_eq!(a.bodygraph_type, BodygraphType::Reflector);
        assert_eq!(a.authority, Authority::Lunar);
        assert_eq!(a.definition, Definition::NoDefinition);
    }

    #[test]
    fn test_channel_across_sides() {
        let a = analyze(&[37], &[40]);
        assert_eq!(names(&a.channels), vec!["37-40"]);
        assert_eq!(a.defined_centers, vec![Center::Ego, Center::SolarPlexus]);
        assert_eq!(a.authority, Authority::Emotional);
        assert_eq!(a.definition, Definition::Single);
        assert_eq!(a.bodygraph_type, BodygraphType::Projector);
    }

    #[test]
    fn test_generator_and_manifesting_generator() {
        // 3-60 defines sacral and root only.
        let g = analyze(&[3], &[60]);
        assert_eq!(g.bodygraph_type, BodygraphType::Generator);
        assert_eq!(g.authority, Authority::Sacral);

        // 20-34 is a direct sacral-throat channel.
        let mg = analyze(&[20], &[34]);
        assert_eq!(mg.bodygraph_type, BodygraphType::ManifestingGenerator);
    }

    #[test]
    fn test_manifestor_direct_and_via_spleen() {
        // 21-45: ego to throat.
        let m = analyze(&[21], &[45]);
        assert_eq!(m.bodygraph_type, BodygraphType::Manifestor);
        assert_eq!(m.authority, Authority::EgoProjected);

        // 16-48 spleen-throat plus 18-58 root-spleen.
        let m = analyze(&[16, 18], &[48, 58]);
        assert_eq!(m.bodygraph_type, BodygraphType::Manifestor);
        assert_eq!(m.authority, Authority::Splenic);
    }

    #[test]
    fn test_multi_partner_gate_completes_every_channel() {
        let a = analyze(&[10], &[20, 34, 57]);
        assert_eq!(
            names(&a.channels),
            vec!["10-20", "10-34", "10-57", "20-34", "20-57", "34-57"]
        );
    }

    #[test]
    fn test_first_policy_sees_fewer_channels() {
        let tables = ReferenceTables::builtin().unwrap();
        let gates: BTreeSet<Gate> = [34, 57].iter().map(|&n| Gate::new(n).unwrap()).collect();

        let any = BodygraphAnalyzer::new(&tables, PartnerPolicy::AnyMatch).channels(&gates);
        assert_eq!(names(&any.into_iter().collect::<Vec<_>>()), vec!["34-57"]);

        // The first partner of both 34 and 57 is 10.
        let first = BodygraphAnalyzer::new(&tables, PartnerPolicy::First).channels(&gates);
        assert!(first.is_empty());

        // The last partner of both 10 and 20 is 57.
        let gates: BTreeSet<Gate> = [10, 20].iter().map(|&n| Gate::new(n).unwrap()).collect();
        let any = BodygraphAnalyzer::new(&tables, PartnerPolicy::AnyMatch).channels(&gates);
        let last = BodygraphAnalyzer::new(&tables, PartnerPolicy::Last).channels(&gates);
        assert_eq!(any.len(), 1);
        assert!(last.is_empty());
    }

    #[test]
    fn test_two_hop_paths_use_listed_channels_only() {
        // 34-57 joins sacral and spleen but does not carry the motor.
        let g = analyze(&[16, 34], &[48, 57]);
        assert_eq!(names(&g.channels), vec!["16-48", "34-57"]);
        assert_eq!(g.bodygraph_type, BodygraphType::Generator);

        // Same for 10-34 between sacral and G.
        let g = analyze(&[1, 10], &[8, 34]);
        assert_eq!(names(&g.channels), vec!["1-8", "10-34"]);
        assert_eq!(g.bodygraph_type, BodygraphType::Generator);

        let mg = analyze(&[16, 27], &[48, 50]);
        assert_eq!(mg.bodygraph_type, BodygraphType::ManifestingGenerator);

        let mg = analyze(&[1, 2], &[8, 14]);
        assert_eq!(mg.bodygraph_type, BodygraphType::ManifestingGenerator);
    }

    #[test]
    fn test_split_definition() {
        // 1-8 (G, throat) and 3-60 (sacral, root) share no center.
        let a = analyze(&[1, 3], &[8, 60]);
        assert_eq!(a.definition, Definition::Split);
        assert_eq!(a.bodygraph_type, BodygraphType::Generator);
    }

    #[test]
    fn test_triple_and_quadruple_split() {
        // 64-47 (head, ajna), 3-60 (sacral, root), 26-44 (ego, spleen)
        let a = analyze(&[64, 3, 26], &[47, 60, 44]);
        assert_eq!(a.definition, Definition::TripleSplit);

        // plus 35-36 (throat, solar plexus)
        let a = analyze(&[64, 3, 26, 35], &[47, 60, 44, 36]);
        assert_eq!(a.definition, Definition::QuadrupleSplit);
    }

    #[test]
    fn test_profile_from_sun_lines() {
        let tables = ReferenceTables::builtin().unwrap();
        let a = BodygraphAnalyzer::new(&tables, PartnerPolicy::AnyMatch)
            .analyze(&chart(&[1], &[2], 4, 6))
            .unwrap();
        assert_eq!(a.profile.to_string(), "4/6");
    }

    #[test]
    fn test_count_components_ignores_order() {
        let pairs = vec![
            (Center::Head, Center::Ajna),
            (Center::Sacral, Center::Root),
            (Center::Ajna, Center::Throat),
        ];
        let mut reversed = pairs.clone();
        reversed.reverse();
        assert_eq!(count_components(pairs), 2);
        assert_eq!(count_components(reversed), 2);
        assert_eq!(count_components(Vec::new()), 0);
    }
}
