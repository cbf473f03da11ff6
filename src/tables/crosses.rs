//! Incarnation cross reference table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::gates::{GateWheel, Quarters};
use crate::types::{ConsistencyError, CrossAngle, CrossKey, Gate};

/// Embedded cross table.
pub const BUILTIN_CROSSES: &str = include_str!("../../data/crosses.json");

/// Raw row as stored in JSON.
#[derive(Debug, Clone, Deserialize)]
struct RawCrossEntry {
    key: [u8; 4],
    angle: CrossAngle,
    number: Option<u8>,
    name: String,
}

/// One named cross for a gate signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossEntry {
    /// Gate signature.
    pub key: CrossKey,
    /// Stored angle.
    pub angle: CrossAngle,
    /// Stored number, absent for juxtapositions.
    pub number: Option<u8>,
    /// Display name without the number.
    pub name: String,
}

/// Cross table keyed by signature. A signature may carry several entries.
#[derive(Debug, Clone)]
pub struct CrossTable {
    entries: BTreeMap<CrossKey, Vec<CrossEntry>>,
}

impl CrossTable {
    /// Parse and validate a JSON cross table.
    ///
    /// Rejects rows whose Earth gates are not opposite their Sun gates on
    /// the wheel, and rows whose stored number disagrees with the number
    /// derived from quarter and angle.
    pub fn from_json(
        json: &str,
        wheel: &GateWheel,
        quarters: &Quarters,
    ) -> Result<Self, ConsistencyError> {
        let rows: Vec<RawCrossEntry> =
            serde_json::from_str(json).map_err(|e| ConsistencyError::Malformed {
                table: "crosses",
                reason: e.to_string(),
            })?;

        let mut entries: BTreeMap<CrossKey, Vec<CrossEntry>> = BTreeMap::new();
        for row in rows {
            let entry = Self::validate_row(row, wheel, quarters)?;
            entries.entry(entry.key).or_default().push(entry);
        }

        Ok(Self { entries })
    }

    fn validate_row(
        row: RawCrossEntry,
        wheel: &GateWheel,
        quarters: &Quarters,
    ) -> Result<CrossEntry, ConsistencyError> {
        let malformed = |reason: String| ConsistencyError::Malformed {
            table: "crosses",
            reason,
        };

        let mut gates = [Gate::from_table(1); 4];
        for (slot, number) in gates.iter_mut().zip(row.key) {
            *slot = Gate::new(number).map_err(|e| malformed(format!("{}: {}", row.name, e)))?;
        }
        let key = CrossKey {
            personality_sun: gates[0],
            personality_earth: gates[1],
            design_sun: gates[2],
            design_earth: gates[3],
        };

        if wheel.opposite(key.personality_sun) != key.personality_earth
            || wheel.opposite(key.design_sun) != key.design_earth
        {
            return Err(malformed(format!(
                "{} ({}): earth gates must be opposite sun gates",
                row.name, key
            )));
        }

        let derived = row
            .angle
            .number_in_quarter(quarters.quarter_of(key.personality_sun));
        if derived != row.number {
            return Err(ConsistencyError::CrossNumberMismatch {
                name: row.name,
                key: key.to_string(),
                stored: row.number,
                derived,
            });
        }

        Ok(CrossEntry {
            key,
            angle: row.angle,
            number: row.number,
            name: row.name,
        })
    }

    /// Entries for a signature, in table order.
    pub fn lookup(&self, key: &CrossKey) -> &[CrossEntry] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in signature order.
    pub fn iter(&self) -> impl Iterator<Item = &CrossEntry> {
        self.entries.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::gates::{GATE_ORDER, QUARTERS};

    fn parts() -> (GateWheel, Quarters) {
        (
            GateWheel::new(&GATE_ORDER).unwrap(),
            Quarters::new(&QUARTERS).unwrap(),
        )
    }

    fn key(k: [u8; 4]) -> CrossKey {
        CrossKey {
            personality_sun: Gate::new(k[0]).unwrap(),
            personality_earth: Gate::new(k[1]).unwrap(),
            design_sun: Gate::new(k[2]).unwrap(),
            design_earth: Gate::new(k[3]).unwrap(),
        }
    }

    #[test]
    fn test_builtin_table_valid() {
        let (wheel, quarters) = parts();
        let table = CrossTable::from_json(BUILTIN_CROSSES, &wheel, &quarters).unwrap();
        assert!(!table.is_empty());

        let maya = table.lookup(&key([32, 42, 62, 61]));
        assert_eq!(maya.len(), 1);
        assert_eq!(maya[0].number, Some(3));
    }

    #[test]
    fn test_shared_signature_keeps_all_entries() {
        let (wheel, quarters) = parts();
        let table = CrossTable::from_json(BUILTIN_CROSSES, &wheel, &quarters).unwrap();
        let entries = table.lookup(&key([13, 7, 43, 23]));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].angle, CrossAngle::Juxtaposition);
        assert_eq!(entries[1].angle, CrossAngle::LeftAngle);
    }

    #[test]
    fn test_number_mismatch_rejected() {
        let (wheel, quarters) = parts();
        let json = r#"[{"key":[32,42,62,61],"angle":"RightAngle","number":1,"name":"Bad Maya"}]"#;
        let err = CrossTable::from_json(json, &wheel, &quarters).unwrap_err();
        match err {
            ConsistencyError::CrossNumberMismatch {
                stored, derived, ..
            } => {
                assert_eq!(stored, Some(1));
                assert_eq!(derived, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_juxtaposition_with_number_rejected() {
        let (wheel, quarters) = parts();
        let json = r#"[{"key":[13,7,43,23],"angle":"Juxtaposition","number":1,"name":"Bad"}]"#;
        assert!(matches!(
            CrossTable::from_json(json, &wheel, &quarters),
            Err(ConsistencyError::CrossNumberMismatch { .. })
        ));
    }

    #[test]
    fn test_non_opposite_earth_rejected() {
        let (wheel, quarters) = parts();
        let json = r#"[{"key":[13,8,1,2],"angle":"RightAngle","number":1,"name":"Bad"}]"#;
        assert!(matches!(
            CrossTable::from_json(json, &wheel, &quarters),
            Err(ConsistencyError::Malformed { .. })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let (wheel, quarters) = parts();
        assert!(matches!(
            CrossTable::from_json("{not json", &wheel, &quarters),
            Err(ConsistencyError::Malformed { table: "crosses", .. })
        ));
    }
}
