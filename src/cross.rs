//! Incarnation cross classification.
//!
//! The signature is the personality Sun and Earth gates followed by the
//! design Sun and Earth gates. A table hit supplies the angle and name; a
//! miss infers the angle from the Sun lines and synthesizes a generic,
//! unnumbered name. The quarter never depends on the lookup.

use tracing::warn;

use crate::tables::{CrossEntry, ReferenceTables};
use crate::types::{Body, Chart, CrossAngle, CrossKey, IncarnationCross};

/// Classifies a chart's incarnation cross.
pub struct CrossClassifier<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> CrossClassifier<'a> {
    /// Create a classifier.
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    /// Signature of a chart.
    pub fn key(chart: &Chart) -> CrossKey {
        CrossKey {
            personality_sun: chart.personality.get(Body::Sun).gate,
            personality_earth: chart.personality.get(Body::Earth).gate,
            design_sun: chart.design.get(Body::Sun).gate,
            design_earth: chart.design.get(Body::Earth).gate,
        }
    }

    /// Angle implied by the personality and design Sun lines.
    pub fn inferred_angle(chart: &Chart) -> CrossAngle {
        CrossAngle::from_lines(
            chart.personality.get(Body::Sun).line,
            chart.design.get(Body::Sun).line,
        )
    }

    /// Pick one entry from a signature's candidates.
    ///
    /// One candidate is adopted as is. Among several, the one whose angle
    /// matches the line-inferred angle wins, else the first.
    fn select<'e>(entries: &'e [CrossEntry], inferred: CrossAngle) -> Option<&'e CrossEntry> {
        match entries {
            [] => None,
            [only] => Some(only),
            many => many
                .iter()
                .find(|e| e.angle == inferred)
                .or_else(|| many.first()),
        }
    }

    /// Classify a chart. Never fails: a table miss yields a synthesized,
    /// unmatched cross.
    pub fn classify(&self, chart: &Chart) -> IncarnationCross {
        let key = Self::key(chart);
        let inferred = Self::inferred_angle(chart);
        let quarter = self.tables.quarters().quarter_of(key.personality_sun);

        match Self::select(self.tables.crosses().lookup(&key), inferred) {
            Some(entry) => IncarnationCross {
                key,
                angle: entry.angle,
                quarter,
                number: entry.angle.number_in_quarter(quarter),
                name: entry.name.clone(),
                matched: true,
            },
            None => {
                warn!(key = %key, angle = %inferred, "Incarnation cross not in table, synthesizing");
                IncarnationCross {
                    key,
                    angle: inferred,
                    quarter,
                    number: None,
                    name: format!("{} Cross of Gate {}", inferred, key.personality_sun),
                    matched: false,
                }
            }
        }
    }
}
