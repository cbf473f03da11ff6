//! Direct fixing rules keyed by (body, gate, line).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Body, ConsistencyError, FixingState, Gate, Line};

/// Embedded rule table.
pub const BUILTIN_FIXING_RULES: &str = include_str!("../../data/fixing_rules.json");

#[derive(Debug, Clone, Deserialize)]
struct RawRule {
    body: String,
    gate: u8,
    line: u8,
    state: String,
}

/// A single direct rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixingRule {
    /// Body the rule applies to.
    pub body: Body,
    /// Gate.
    pub gate: Gate,
    /// Line.
    pub line: Line,
    /// Resulting state.
    pub state: FixingState,
}

/// Direct rule lookup. Absent keys yield [`FixingState::NONE`].
#[derive(Debug, Clone, Default)]
pub struct FixingRules {
    rules: BTreeMap<(Body, Gate, Line), FixingState>,
}

impl FixingRules {
    /// Parse and validate a JSON rule table. Duplicate keys are rejected.
    pub fn from_json(json: &str) -> Result<Self, ConsistencyError> {
        let malformed = |reason: String| ConsistencyError::Malformed {
            table: "fixing_rules",
            reason,
        };

        let rows: Vec<RawRule> = serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;

        let mut rules = BTreeMap::new();
        for row in rows {
            let body = Body::from_str(&row.body)
                .ok_or_else(|| malformed(format!("unknown body '{}'", row.body)))?;
            let gate = Gate::new(row.gate).map_err(|e| malformed(e.to_string()))?;
            let line = Line::new(row.line).map_err(|e| malformed(e.to_string()))?;
            let state = FixingState::from_name(&row.state)
                .ok_or_else(|| malformed(format!("unknown state '{}'", row.state)))?;

            if rules.insert((body, gate, line), state).is_some() {
                return Err(malformed(format!(
                    "duplicate rule for {} {}.{}",
                    body, gate, line
                )));
            }
        }

        Ok(Self { rules })
    }

    /// Rule for (body, gate, line), or none.
    pub fn state(&self, body: Body, gate: Gate, line: Line) -> FixingState {
        self.rules
            .get(&(body, gate, line))
            .copied()
            .unwrap_or(FixingState::NONE)
    }

    /// All rules in key order.
    pub fn iter(&self) -> impl Iterator<Item = FixingRule> + '_ {
        self.rules.iter().map(|(&(body, gate, line), &state)| FixingRule {
            body,
            gate,
            line,
            state,
        })
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
