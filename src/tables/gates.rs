//! Gate wheel order and quarter partition.

use std::collections::BTreeMap;

use crate::types::{ConsistencyError, Gate};

/// Gates in wheel order, starting at the calibration zero point.
pub const GATE_ORDER: [u8; 64] = [
    17, 21, 51, 42, 3, 27, 24, 2, 23, 8, 20, 16, 35, 45, 12, 15, //
    52, 39, 53, 62, 56, 31, 33, 7, 4, 29, 59, 40, 64, 47, 6, 46, //
    18, 48, 57, 32, 50, 28, 44, 1, 43, 14, 34, 9, 5, 26, 11, 10, //
    58, 38, 54, 61, 60, 41, 19, 13, 49, 30, 55, 37, 63, 22, 36, 25,
];

/// The four quarters, each 16 gates in wheel order.
pub const QUARTERS: [[u8; 16]; 4] = [
    [13, 49, 30, 55, 37, 63, 22, 36, 25, 17, 21, 51, 42, 3, 27, 24],
    [2, 23, 8, 20, 16, 35, 45, 12, 15, 52, 39, 53, 62, 56, 31, 33],
    [7, 4, 29, 59, 40, 64, 47, 6, 46, 18, 48, 57, 32, 50, 28, 44],
    [1, 43, 14, 34, 9, 5, 26, 11, 10, 58, 38, 54, 61, 60, 41, 19],
];

/// Validated wheel order with a reverse index.
#[derive(Debug, Clone)]
pub struct GateWheel {
    order: Vec<Gate>,
    positions: BTreeMap<Gate, usize>,
}

impl GateWheel {
    /// Build a wheel. `order` must be a permutation of 1..=64.
    pub fn new(order: &[u8]) -> Result<Self, ConsistencyError> {
        if order.len() != Gate::COUNT {
            return Err(ConsistencyError::GateOrder(format!(
                "expected {} entries, found {}",
                Gate::COUNT,
                order.len()
            )));
        }

        let mut gates = Vec::with_capacity(Gate::COUNT);
        let mut positions = BTreeMap::new();
        for (index, &number) in order.iter().enumerate() {
            let gate = Gate::new(number)
                .map_err(|e| ConsistencyError::GateOrder(e.to_string()))?;
            if positions.insert(gate, index).is_some() {
                return Err(ConsistencyError::GateOrder(format!(
                    "gate {} appears twice",
                    gate
                )));
            }
            gates.push(gate);
        }

        Ok(Self {
            order: gates,
            positions,
        })
    }

    /// Gate at a wheel index. The index wraps modulo 64.
    pub fn gate_at(&self, index: usize) -> Gate {
        self.order[index % Gate::COUNT]
    }

    /// Wheel index of a gate.
    pub fn position(&self, gate: Gate) -> usize {
        // The wheel is a permutation, so every gate has a position.
        self.positions[&gate]
    }

    /// The gate 180° across the wheel.
    pub fn opposite(&self, gate: Gate) -> Gate {
        self.gate_at(self.position(gate) + Gate::COUNT / 2)
    }

    /// Gates in wheel order.
    pub fn order(&self) -> &[Gate] {
        &self.order
    }
}

/// Validated quarter partition.
#[derive(Debug, Clone)]
pub struct Quarters {
    groups: Vec<Vec<Gate>>,
    of_gate: BTreeMap<Gate, u8>,
}

impl Quarters {
    /// Build a partition. Every gate must appear in exactly one quarter.
    pub fn new(groups: &[[u8; 16]; 4]) -> Result<Self, ConsistencyError> {
        let mut of_gate = BTreeMap::new();
        let mut out = Vec::with_capacity(4);

        for (i, group) in groups.iter().enumerate() {
            let quarter = (i + 1) as u8;
            let mut members = Vec::with_capacity(16);
            for &number in group {
                let gate = Gate::new(number)
                    .map_err(|e| ConsistencyError::QuarterPartition(e.to_string()))?;
                if let Some(prev) = of_gate.insert(gate, quarter) {
                    return Err(ConsistencyError::QuarterPartition(format!(
                        "gate {} in quarters {} and {}",
                        gate, prev, quarter
                    )));
                }
                members.push(gate);
            }
            out.push(members);
        }

        if let Some(missing) = Gate::all().find(|g| !of_gate.contains_key(g)) {
            return Err(ConsistencyError::QuarterPartition(format!(
                "gate {} not in any quarter",
                missing
            )));
        }

        Ok(Self {
            groups: out,
            of_gate,
        })
    }

    /// Quarter (1-4) containing a gate.
    pub fn quarter_of(&self, gate: Gate) -> u8 {
        // Totality checked at construction.
        self.of_gate[&gate]
    }

    /// Members of quarter `q` (1-4), in table order.
    pub fn members(&self, q: u8) -> &[Gate] {
        match q {
            1..=4 => &self.groups[(q - 1) as usize],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_wheel_is_permutation() {
        let wheel = GateWheel::new(&GATE_ORDER).unwrap();
        assert_eq!(wheel.order().len(), 64);
        assert_eq!(wheel.gate_at(0).get(), 17);
        assert_eq!(wheel.gate_at(64).get(), 17);
        assert_eq!(wheel.position(Gate::new(25).unwrap()), 63);
    }

    #[test]
    fn test_wheel_rejects_duplicates() {
        let mut order = GATE_ORDER;
        order[1] = 17;
        let err = GateWheel::new(&order).unwrap_err();
        assert!(matches!(err, ConsistencyError::GateOrder(_)));

        assert!(GateWheel::new(&GATE_ORDER[..63]).is_err());
    }

    #[test]
    fn test_opposites() {
        let wheel = GateWheel::new(&GATE_ORDER).unwrap();
        let g = |n| Gate::new(n).unwrap();
        assert_eq!(wheel.opposite(g(13)), g(7));
        assert_eq!(wheel.opposite(g(1)), g(2));
        assert_eq!(wheel.opposite(g(32)), g(42));
    }

    #[test]
    fn test_quarters_partition() {
        let quarters = Quarters::new(&QUARTERS).unwrap();
        for q in 1..=4 {
            assert_eq!(quarters.members(q).len(), 16);
        }
        assert!(quarters.members(5).is_empty());
        assert_eq!(quarters.quarter_of(Gate::new(32).unwrap()), 3);
        assert_eq!(quarters.quarter_of(Gate::new(13).unwrap()), 1);
    }

    #[test]
    fn test_quarters_are_contiguous_arcs() {
        let wheel = GateWheel::new(&GATE_ORDER).unwrap();
        let quarters = Quarters::new(&QUARTERS).unwrap();
        for q in 1..=4u8 {
            let members = quarters.members(q);
            let start = wheel.position(members[0]);
            for (offset, gate) in members.iter().enumerate() {
                assert_eq!(wheel.gate_at(start + offset), *gate);
            }
        }
    }

    #[test]
    fn test_quarters_reject_overlap() {
        let mut groups = QUARTERS;
        groups[1][0] = 13;
        assert!(matches!(
            Quarters::new(&groups),
            Err(ConsistencyError::QuarterPartition(_))
        ));
    }
}
