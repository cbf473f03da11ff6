//! Static reference tables.
//!
//! Everything the pipeline looks up lives in [`ReferenceTables`], built and
//! validated once, then shared through an `Arc`. No component loads a table
//! on its own.
//!
//! ## Tables
//!
//! | Table | Source | Validation |
//! |-------|--------|------------|
//! | Gate wheel | [`GATE_ORDER`] | permutation of 1-64 |
//! | Quarters | [`QUARTERS`] | 4 x 16, disjoint, covers all gates |
//! | Channels | [`CHANNELS`] | 36 distinct, one center per gate |
//! | Harmonic partners | derived from channels | every gate has one |
//! | Crosses | `data/crosses.json` | earth opposite sun, number matches quarter rule |
//! | Fixing rules | `data/fixing_rules.json` | known bodies, unique keys |

pub mod gates;
pub mod channels;
pub mod crosses;
pub mod fixing;

use serde::Serialize;

use crate::canonical::canonical_hash_hex;
use crate::types::{Center, ConsistencyError};

pub use channels::{ChannelTable, HarmonicPartners, PartnerPolicy, PartnerTable, CHANNELS};
pub use crosses::{CrossEntry, CrossTable, BUILTIN_CROSSES};
pub use fixing::{FixingRule, FixingRules, BUILTIN_FIXING_RULES};
pub use gates::{GateWheel, Quarters, GATE_ORDER, QUARTERS};

/// All reference data, validated.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    wheel: GateWheel,
    quarters: Quarters,
    channels: ChannelTable,
    partners: PartnerTable,
    crosses: CrossTable,
    fixing: FixingRules,
    fingerprint: String,
}

#[derive(Serialize)]
struct TablesDigest<'a> {
    gate_order: Vec<u8>,
    quarters: Vec<Vec<u8>>,
    channels: Vec<(u8, u8, Center, Center)>,
    crosses: Vec<&'a CrossEntry>,
    fixing: Vec<FixingRule>,
}

impl ReferenceTables {
    /// Build from the tables compiled into the crate.
    pub fn builtin() -> Result<Self, ConsistencyError> {
        Self::from_sources(
            &GATE_ORDER,
            &QUARTERS,
            &CHANNELS,
            BUILTIN_CROSSES,
            BUILTIN_FIXING_RULES,
        )
    }

    /// Build from explicit sources. Every table is validated.
    pub fn from_sources(
        gate_order: &[u8],
        quarters: &[[u8; 16]; 4],
        channels: &[(u8, u8, Center, Center)],
        crosses_json: &str,
        fixing_json: &str,
    ) -> Result<Self, ConsistencyError> {
        let wheel = GateWheel::new(gate_order)?;
        let quarters = Quarters::new(quarters)?;
        let channels = ChannelTable::new(channels)?;
        let partners = PartnerTable::from_channels(&channels)?;
        let crosses = CrossTable::from_json(crosses_json, &wheel, &quarters)?;
        let fixing = FixingRules::from_json(fixing_json)?;

        let mut tables = Self {
            wheel,
            quarters,
            channels,
            partners,
            crosses,
            fixing,
            fingerprint: String::new(),
        };
        tables.fingerprint = tables.compute_fingerprint();

        tracing::debug!(
            fingerprint = %tables.fingerprint,
            channels = tables.channels.len(),
            crosses = tables.crosses.len(),
            fixing_rules = tables.fixing.len(),
            "Reference tables loaded"
        );

        Ok(tables)
    }

    /// Replace the fixing rules, revalidating.
    pub fn with_fixing_rules(mut self, fixing_json: &str) -> Result<Self, ConsistencyError> {
        self.fixing = FixingRules::from_json(fixing_json)?;
        self.fingerprint = self.compute_fingerprint();
        Ok(self)
    }

    /// Replace the cross table, revalidating.
    pub fn with_crosses(mut self, crosses_json: &str) -> Result<Self, ConsistencyError> {
        self.crosses = CrossTable::from_json(crosses_json, &self.wheel, &self.quarters)?;
        self.fingerprint = self.compute_fingerprint();
        Ok(self)
    }

    fn compute_fingerprint(&self) -> String {
        let digest = TablesDigest {
            gate_order: self.wheel.order().iter().map(|g| g.get()).collect(),
            quarters: (1..=4)
                .map(|q| self.quarters.members(q).iter().map(|g| g.get()).collect())
                .collect(),
            channels: self
                .channels
                .iter()
                .map(|(c, [a, b])| (c.low().get(), c.high().get(), a, b))
                .collect(),
            crosses: self.crosses.iter().collect(),
            fixing: self.fixing.iter().collect(),
        };
        canonical_hash_hex(&digest)
    }

    /// Hash of every table. Changes whenever any reference data changes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Gate wheel.
    pub fn wheel(&self) -> &GateWheel {
        &self.wheel
    }

    /// Quarter partition.
    pub fn quarters(&self) -> &Quarters {
        &self.quarters
    }

    /// Channel table.
    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    /// Harmonic partners.
    pub fn partners(&self) -> &PartnerTable {
        &self.partners
    }

    /// Cross table.
    pub fn crosses(&self) -> &CrossTable {
        &self.crosses
    }

    /// Direct fixing rules.
    pub fn fixing_rules(&self) -> &FixingRules {
        &self.fixing
    }
}
