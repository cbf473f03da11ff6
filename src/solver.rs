//! Design-moment solver.
//!
//! Finds the instant before birth at which the Sun stood `design_arc_deg`
//! (88°) behind its birth longitude, by bisection over a fixed window.
//!
//! ## Algorithm
//!
//! ```text
//! target = (birth_sun - 88) mod 360
//! lo, hi = birth - 110d, birth - 70d
//! loop (at most max_iterations):
//!     mid  = (lo + hi) / 2
//!     diff = target - sun(mid), normalized to (-180, 180]
//!     |diff| < tolerance -> done
//!     diff > 0 -> lo = mid   (Sun has not reached the target yet)
//!     else     -> hi = mid
//! ```
//!
//! If the cap is hit, the design instant falls back to birth - 88 days and
//! is marked degraded.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ephemeris::{EphemerisError, EphemerisProvider};
use crate::mapper::normalize_degrees;
use crate::policy::SolverParams;
use crate::types::{Body, Precision};

/// Signed circular difference `target - actual`, in (-180, 180].
pub fn signed_delta(target: f64, actual: f64) -> f64 {
    let d = (target - actual).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

fn days(d: f64) -> Duration {
    Duration::milliseconds((d * 86_400_000.0).round() as i64)
}

/// Result of solving for the design instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignMoment {
    /// The design instant.
    pub instant: DateTime<Utc>,
    /// Bisection steps taken.
    pub iterations: u32,
    /// |target - sun(instant)| at the reported instant, in degrees.
    pub residual_deg: f64,
    /// Whether the tolerance was reached.
    pub converged: bool,
    /// Degraded if any Sun reading was degraded or the solver fell back.
    pub precision: Precision,
}

/// Bisection solver over an ephemeris provider.
pub struct DesignSolver<'a, P: ?Sized> {
    provider: &'a P,
    params: &'a SolverParams,
    arc_deg: f64,
}

impl<'a, P: EphemerisProvider + ?Sized> DesignSolver<'a, P> {
    /// Create a solver.
    pub fn new(provider: &'a P, params: &'a SolverParams, arc_deg: f64) -> Self {
        Self {
            provider,
            params,
            arc_deg,
        }
    }

    /// Solve given the birth instant and the Sun's longitude at birth.
    ///
    /// Deterministic for a deterministic provider. Provider errors propagate.
    pub async fn solve(
        &self,
        birth: DateTime<Utc>,
        birth_sun: f64,
    ) -> Result<DesignMoment, EphemerisError> {
        let target = normalize_degrees(birth_sun - self.arc_deg);
        let mut lo = birth - days(self.params.window_start_days);
        let mut hi = birth - days(self.params.window_end_days);

        let mut precision = Precision::Exact;
        let mut residual = f64::INFINITY;

        for iteration in 1..=self.params.max_iterations {
            let mid = lo + (hi - lo) / 2;
            let reading = self.provider.longitude(mid, Body::Sun).await?;
            precision = precision.merge(reading.precision);

            let diff = signed_delta(target, reading.longitude);
            residual = diff.abs();

            if residual < self.params.tolerance_deg {
                debug!(
                    iterations = iteration,
                    residual_deg = residual,
                    design = %mid,
                    "Design moment converged"
                );
                return Ok(DesignMoment {
                    instant: mid,
                    iterations: iteration,
                    residual_deg: residual,
                    converged: true,
                    precision,
                });
            }

            if diff > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let instant = birth - days(self.params.fallback_days);
        let reading = self.provider.longitude(instant, Body::Sun).await?;
        precision = precision.merge(reading.precision);
        let fallback_residual = signed_delta(target, reading.longitude).abs();
        warn!(
            iterations = self.params.max_iterations,
            last_residual_deg = residual,
            residual_deg = fallback_residual,
            fallback = %instant,
            "Design moment did not converge, using fixed offset"
        );

        Ok(DesignMoment {
            instant,
            iterations: self.params.max_iterations,
            residual_deg: fallback_residual,
            converged: false,
            precision: precision.merge(Precision::degraded(format!(
                "design solver did not converge; fixed {}-day offset used",
                self.params.fallback_days
            ))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{TableEphemeris, Track};
    use chrono::TimeZone;

    fn birth() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_signed_delta_range() {
        assert_eq!(signed_delta(10.0, 350.0), 20.0);
        assert_eq!(signed_delta(350.0, 10.0), -20.0);
        assert_eq!(signed_delta(180.0, 0.0), 180.0);
        assert_eq!(signed_delta(0.0, 180.0), 180.0);
        assert_eq!(signed_delta(5.0, 5.0), 0.0);
    }

    #[tokio::test]
    async fn test_linear_sun_solves_to_88_days() {
        let table = TableEphemeris::new().with_track(
            Body::Sun,
            Track::Linear {
                epoch: birth(),
                longitude: 280.0,
                degrees_per_day: 1.0,
            },
        );
        let params = SolverParams::default();
        let moment = DesignSolver::new(&table, &params, 88.0)
            .solve(birth(), 280.0)
            .await
            .unwrap();

        assert!(moment.converged);
        assert!(moment.residual_deg < params.tolerance_deg);
        assert!(moment.iterations <= params.max_iterations);
        assert_eq!(moment.precision, Precision::Exact);

        let offset_days = (birth() - moment.instant).num_milliseconds() as f64 / 86_400_000.0;
        assert!((offset_days - 88.0).abs() < 0.001, "offset = {offset_days}");
    }

    #[tokio::test]
    async fn test_target_across_zero_point() {
        // Birth Sun at 40°, target 312°: the window straddles 0°.
        let table = TableEphemeris::new().with_track(
            Body::Sun,
            Track::Linear {
                epoch: birth(),
                longitude: 40.0,
                degrees_per_day: 0.98,
            },
        );
        let params = SolverParams::default();
        let moment = DesignSolver::new(&table, &params, 88.0)
            .solve(birth(), 40.0)
            .await
            .unwrap();

        assert!(moment.converged);
        let offset_days = (birth() - moment.instant).num_milliseconds() as f64 / 86_400_000.0;
        assert!((offset_days - 88.0 / 0.98).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_non_convergence_falls_back() {
        let table = TableEphemeris::new().with_track(Body::Sun, Track::Fixed(280.0));
        let params = SolverParams {
            max_iterations: 25,
            ..SolverParams::default()
        };
        let moment = DesignSolver::new(&table, &params, 88.0)
            .solve(birth(), 280.0)
            .await
            .unwrap();

        assert!(!moment.converged);
        assert_eq!(moment.iterations, 25);
        assert_eq!(moment.instant, birth() - Duration::days(88));
        assert!(moment.precision.is_degraded());
        assert!((moment.residual_deg - 88.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fallback_residual_is_measured_at_fallback_instant() {
        let table = TableEphemeris::new().with_track(
            Body::Sun,
            Track::Linear {
                epoch: birth(),
                longitude: 280.0,
                degrees_per_day: 1.0,
            },
        );
        // Midpoints at 90 and 80 days back miss by 2° and 8°.
        let params = SolverParams {
            max_iterations: 2,
            ..SolverParams::default()
        };
        let moment = DesignSolver::new(&table, &params, 88.0)
            .solve(birth(), 280.0)
            .await
            .unwrap();

        assert!(!moment.converged);
        assert_eq!(moment.instant, birth() - Duration::days(88));
        assert!(moment.residual_deg < 1e-9, "residual {}", moment.residual_deg);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let table = TableEphemeris::new();
        let params = SolverParams::default();
        let err = DesignSolver::new(&table, &params, 88.0)
            .solve(birth(), 280.0)
            .await
            .unwrap_err();
        assert!(matches!(err, EphemerisError::OutOfRange { body: Body::Sun, .. }));
    }
}
