//! Channel to center table and the harmonic partners derived from it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Center, Channel, ConsistencyError, Gate};

use Center::*;

/// The 36 channels with the centers at each end, lower gate first.
pub const CHANNELS: [(u8, u8, Center, Center); 36] = [
    (1, 8, G, Throat),
    (2, 14, G, Sacral),
    (3, 60, Sacral, Root),
    (4, 63, Ajna, Head),
    (5, 15, Sacral, G),
    (6, 59, SolarPlexus, Sacral),
    (7, 31, G, Throat),
    (9, 52, Sacral, Root),
    (10, 20, G, Throat),
    (10, 34, G, Sacral),
    (10, 57, G, Spleen),
    (11, 56, Ajna, Throat),
    (12, 22, Throat, SolarPlexus),
    (13, 33, G, Throat),
    (16, 48, Throat, Spleen),
    (17, 62, Ajna, Throat),
    (18, 58, Spleen, Root),
    (19, 49, Root, SolarPlexus),
    (20, 34, Throat, Sacral),
    (20, 57, Throat, Spleen),
    (21, 45, Ego, Throat),
    (23, 43, Throat, Ajna),
    (24, 61, Ajna, Head),
    (25, 51, G, Ego),
    (26, 44, Ego, Spleen),
    (27, 50, Sacral, Spleen),
    (28, 38, Spleen, Root),
    (29, 46, Sacral, G),
    (30, 41, SolarPlexus, Root),
    (32, 54, Spleen, Root),
    (34, 57, Sacral, Spleen),
    (35, 36, Throat, SolarPlexus),
    (37, 40, SolarPlexus, Ego),
    (39, 55, Root, SolarPlexus),
    (42, 53, Sacral, Root),
    (47, 64, Ajna, Head),
];

/// Validated channel table with a derived gate-to-center map.
#[derive(Debug, Clone)]
pub struct ChannelTable {
    channels: BTreeMap<Channel, [Center; 2]>,
    center_of: BTreeMap<Gate, Center>,
}

impl ChannelTable {
    /// Build the table.
    ///
    /// Each entry must join two distinct centers, no channel may repeat,
    /// every gate must sit in exactly one center, and every gate must
    /// belong to at least one channel.
    pub fn new(entries: &[(u8, u8, Center, Center)]) -> Result<Self, ConsistencyError> {
        let mut channels = BTreeMap::new();
        let mut center_of: BTreeMap<Gate, Center> = BTreeMap::new();

        for &(a, b, ca, cb) in entries {
            let ga = Gate::new(a).map_err(|e| ConsistencyError::ChannelTable(e.to_string()))?;
            let gb = Gate::new(b).map_err(|e| ConsistencyError::ChannelTable(e.to_string()))?;
            if ga == gb || ca == cb {
                return Err(ConsistencyError::ChannelTable(format!(
                    "channel {}-{} must join two gates in two centers",
                    a, b
                )));
            }

            for (gate, center) in [(ga, ca), (gb, cb)] {
                match center_of.get(&gate) {
                    Some(existing) if *existing != center => {
                        return Err(ConsistencyError::ChannelTable(format!(
                            "gate {} assigned to both {} and {}",
                            gate, existing, center
                        )));
                    }
                    _ => {
                        center_of.insert(gate, center);
                    }
                }
            }

            let channel = Channel::new(ga, gb);
            let ends = if channel.low() == ga { [ca, cb] } else { [cb, ca] };
            if channels.insert(channel, ends).is_some() {
                return Err(ConsistencyError::ChannelTable(format!(
                    "channel {} listed twice",
                    channel
                )));
            }
        }

        if let Some(missing) = Gate::all().find(|g| !center_of.contains_key(g)) {
            return Err(ConsistencyError::MissingGate {
                table: "channels",
                gate: missing.get(),
            });
        }

        Ok(Self {
            channels,
            center_of,
        })
    }

    /// Centers at each end of a channel, lower gate's center first.
    pub fn centers(&self, channel: Channel) -> Result<[Center; 2], ConsistencyError> {
        self.channels
            .get(&channel)
            .copied()
            .ok_or_else(|| ConsistencyError::UnknownChannel(channel.to_string()))
    }

    /// The center a gate belongs to.
    pub fn center_of(&self, gate: Gate) -> Center {
        // Totality checked at construction.
        self.center_of[&gate]
    }

    /// Whether a channel is in the table.
    pub fn contains(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    /// All channels with their centers, in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, [Center; 2])> + '_ {
        self.channels.iter().map(|(c, e)| (*c, *e))
    }

    /// Channels joining centers `a` and `b` (in either direction).
    pub fn between(&self, a: Center, b: Center) -> BTreeSet<Channel> {
        self.iter()
            .filter(|(_, [x, y])| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|(c, _)| c)
            .collect()
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// How a consumer turns a partner entry into concrete gates.
///
/// No variant is implied: every call site names the one it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerPolicy {
    /// The first candidate in ascending gate order.
    First,
    /// The last candidate in ascending gate order.
    Last,
    /// Every candidate.
    AnyMatch,
}

/// The gates that complete a channel with a given gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmonicPartners {
    /// Exactly one partner.
    OneOf(Gate),
    /// Several structurally valid partners, ascending.
    ManyOf(Vec<Gate>),
}

impl HarmonicPartners {
    /// Candidates selected by `policy`.
    pub fn resolve(&self, policy: PartnerPolicy) -> Vec<Gate> {
        match (self, policy) {
            (Self::OneOf(g), _) => vec![*g],
            (Self::ManyOf(gs), PartnerPolicy::First) => gs.first().copied().into_iter().collect(),
            (Self::ManyOf(gs), PartnerPolicy::Last) => gs.last().copied().into_iter().collect(),
            (Self::ManyOf(gs), PartnerPolicy::AnyMatch) => gs.clone(),
        }
    }

    /// Whether more than one candidate exists.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::ManyOf(_))
    }
}

/// Harmonic partners for all 64 gates.
#[derive(Debug, Clone)]
pub struct PartnerTable {
    partners: BTreeMap<Gate, HarmonicPartners>,
}

impl PartnerTable {
    /// Derive partners from the channel table.
    pub fn from_channels(channels: &ChannelTable) -> Result<Self, ConsistencyError> {
        let mut raw: BTreeMap<Gate, BTreeSet<Gate>> = BTreeMap::new();
        for (channel, _) in channels.iter() {
            raw.entry(channel.low()).or_default().insert(channel.high());
            raw.entry(channel.high()).or_default().insert(channel.low());
        }

        if let Some(missing) = Gate::all().find(|g| !raw.contains_key(g)) {
            return Err(ConsistencyError::MissingPartner(missing.get()));
        }

        let partners = raw
            .into_iter()
            .map(|(gate, set)| {
                let mut gates: Vec<Gate> = set.into_iter().collect();
                let entry = if gates.len() == 1 {
                    HarmonicPartners::OneOf(gates.remove(0))
                } else {
                    HarmonicPartners::ManyOf(gates)
                };
                (gate, entry)
            })
            .collect();

        Ok(Self { partners })
    }

    /// Partner entry for a gate.
    pub fn get(&self, gate: Gate) -> &HarmonicPartners {
        // Totality checked at construction.
        &self.partners[&gate]
    }

    /// Resolve a gate's partners under `policy`.
    pub fn resolve(&self, gate: Gate, policy: PartnerPolicy) -> Vec<Gate> {
        self.get(gate).resolve(policy)
    }

    /// Gates with more than one partner.
    pub fn ambiguous(&self) -> impl Iterator<Item = Gate> + '_ {
        self.partners
            .iter()
            .filter(|(_, p)| p.is_ambiguous())
            .map(|(g, _)| *g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(n: u8) -> Gate {
        Gate::new(n).unwrap()
    }

    #[test]
    fn test_builtin_channels_valid() {
        let table = ChannelTable::new(&CHANNELS).unwrap();
        assert_eq!(table.len(), 36);
        assert_eq!(table.center_of(g(37)), Center::SolarPlexus);
        assert_eq!(table.center_of(g(40)), Center::Ego);
        assert_eq!(
            table.centers(Channel::new(g(40), g(37))).unwrap(),
            [Center::SolarPlexus, Center::Ego]
        );
    }

    #[test]
    fn test_unknown_channel() {
        let table = ChannelTable::new(&CHANNELS).unwrap();
        let err = table.centers(Channel::new(g(1), g(2))).unwrap_err();
        assert_eq!(err, ConsistencyError::UnknownChannel("1-2".to_string()));
    }

    #[test]
    fn test_conflicting_center_rejected() {
        let mut entries = CHANNELS.to_vec();
        entries[0] = (1, 8, Center::Head, Center::Throat);
        assert!(matches!(
            ChannelTable::new(&entries),
            Err(ConsistencyError::ChannelTable(_))
        ));
    }

    #[test]
    fn test_missing_gate_rejected() {
        let entries: Vec<_> = CHANNELS.iter().copied().filter(|e| e.0 != 47).collect();
        assert!(matches!(
            ChannelTable::new(&entries),
            Err(ConsistencyError::MissingGate { .. })
        ));
    }

    #[test]
    fn test_between() {
        let table = ChannelTable::new(&CHANNELS).unwrap();
        let sacral_g: Vec<String> = table
            .between(Center::Sacral, Center::G)
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(sacral_g, vec!["2-14", "5-15", "10-34", "29-46"]);
    }

    #[test]
    fn test_partners_derived() {
        let table = ChannelTable::new(&CHANNELS).unwrap();
        let partners = PartnerTable::from_channels(&table).unwrap();

        assert_eq!(partners.get(g(37)), &HarmonicPartners::OneOf(g(40)));
        assert_eq!(
            partners.get(g(10)),
            &HarmonicPartners::ManyOf(vec![g(20), g(34), g(57)])
        );

        let ambiguous: Vec<u8> = partners.ambiguous().map(|g| g.get()).collect();
        assert_eq!(ambiguous, vec![10, 20, 34, 57]);
    }

    #[test]
    fn test_partner_policies() {
        let many = HarmonicPartners::ManyOf(vec![g(10), g(20), g(34)]);
        assert_eq!(many.resolve(PartnerPolicy::First), vec![g(10)]);
        assert_eq!(many.resolve(PartnerPolicy::Last), vec![g(34)]);
        assert_eq!(many.resolve(PartnerPolicy::AnyMatch).len(), 3);

        let one = HarmonicPartners::OneOf(g(40));
        assert_eq!(one.resolve(PartnerPolicy::Last), vec![g(40)]);
    }
}
