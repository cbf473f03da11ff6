//! Chart assembly: provider readings to a two-sided chart.

use chrono::{DateTime, Duration, Utc};
use futures_util::future::try_join_all;
use std::collections::BTreeMap;
use tracing::debug;

use crate::ephemeris::{in_supported_range, supported_range, EphemerisProvider, Reading};
use crate::kernel::KernelError;
use crate::mapper::{normalize_degrees, ActivationMapper};
use crate::policy::KernelPolicy;
use crate::solver::{DesignMoment, DesignSolver};
use crate::tables::ReferenceTables;
use crate::types::{Body, Chart, ChartSide, Precision, ValidationError};

/// Builds charts from an ephemeris provider.
pub struct ChartAssembler<'a, P: ?Sized> {
    provider: &'a P,
    tables: &'a ReferenceTables,
    policy: &'a KernelPolicy,
}

impl<'a, P: EphemerisProvider + ?Sized> ChartAssembler<'a, P> {
    /// Create an assembler.
    pub fn new(provider: &'a P, tables: &'a ReferenceTables, policy: &'a KernelPolicy) -> Self {
        Self {
            provider,
            tables,
            policy,
        }
    }

    /// All 13 activations at one instant.
    ///
    /// The 11 queried bodies are fetched concurrently; Earth and the south
    /// node are placed 180° from the Sun and north node.
    pub async fn side_at(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<(ChartSide, Precision), KernelError> {
        let readings: BTreeMap<Body, Reading> = try_join_all(Body::QUERIED.iter().map(|&body| async move {
            self.provider
                .longitude(instant, body)
                .await
                .map(|reading| (body, reading))
        }))
        .await?
        .into_iter()
        .collect();

        let mapper = ActivationMapper::new(self.tables.wheel(), self.policy.calibration_offset_deg);
        let mut activations = Vec::with_capacity(Body::ALL.len());
        for body in Body::ALL {
            let longitude = match body.mirror_of() {
                Some(source) => normalize_degrees(Self::reading(&readings, source)?.longitude + 180.0),
                None => Self::reading(&readings, body)?.longitude,
            };
            activations.push(mapper.activation(body, longitude)?);
        }

        let precision: Precision = readings.into_values().map(|r| r.precision).collect();
        let side = ChartSide::from_activations(activations)?;
        Ok((side, precision))
    }

    fn reading(readings: &BTreeMap<Body, Reading>, body: Body) -> Result<&Reading, KernelError> {
        readings
            .get(&body)
            .ok_or_else(|| crate::types::ConsistencyError::MissingBody(body.to_string()).into())
    }

    /// Birth instants whose whole solver window lies in the supported range.
    pub fn birth_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, end) = supported_range();
        let lookback = Duration::milliseconds(
            (self.policy.solver.lookback_days() * 86_400_000.0).ceil() as i64,
        );
        (start + lookback, end)
    }

    /// Assemble personality and design sides for a birth instant.
    ///
    /// Rejects births whose solver window would leave the supported range,
    /// so callers see a validation error instead of a provider failure.
    pub async fn assemble(&self, birth: DateTime<Utc>) -> Result<(Chart, DesignMoment), KernelError> {
        let (start, end) = self.birth_range();
        if !in_supported_range(birth) || birth < start {
            return Err(ValidationError::InstantOutOfRange {
                instant: birth,
                start,
                end,
            }
            .into());
        }

        let (personality, p_precision) = self.side_at(birth).await?;
        let birth_sun = personality.get(Body::Sun).longitude;

        let moment = DesignSolver::new(
            self.provider,
            &self.policy.solver,
            self.policy.design_arc_deg,
        )
        .solve(birth, birth_sun)
        .await?;

        let (design, d_precision) = self.side_at(moment.instant).await?;

        let precision = p_precision
            .merge(d_precision)
            .merge(moment.precision.clone());

        debug!(
            birth = %birth,
            design = %moment.instant,
            iterations = moment.iterations,
            degraded = precision.is_degraded(),
            "Chart assembled"
        );

        let chart = Chart::new(personality, design, birth, moment.instant, precision);
        Ok((chart, moment))
    }
}
