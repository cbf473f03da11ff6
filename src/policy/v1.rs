//! KernelPolicy v1: calibration constants and solver limits.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing (multiply by 1e6 and
//! round to i64), so `params_hash` does not depend on float formatting.

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, quantize};
use crate::tables::PartnerPolicy;
use crate::DEFAULT_POLICY_VERSION;

/// Bisection limits for the design-moment solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Window start, in days before birth.
    pub window_start_days: f64,
    /// Window end, in days before birth.
    pub window_end_days: f64,
    /// Stop when the Sun is within this many degrees of the target.
    pub tolerance_deg: f64,
    /// Hard cap on bisection steps.
    pub max_iterations: u32,
    /// Days before birth used when the solver does not converge.
    pub fallback_days: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            window_start_days: 110.0,
            window_end_days: 70.0,
            tolerance_deg: 0.001,
            max_iterations: 100,
            fallback_days: 88.0,
        }
    }
}

impl SolverParams {
    /// Furthest the solver may look back from birth, in days.
    pub fn lookback_days(&self) -> f64 {
        self.window_start_days
            .max(self.window_end_days)
            .max(self.fallback_days)
    }

    fn to_quantized(&self) -> QuantizedSolverParams {
        QuantizedSolverParams {
            window_start_days: quantize(self.window_start_days),
            window_end_days: quantize(self.window_end_days),
            tolerance_deg: quantize(self.tolerance_deg),
            max_iterations: self.max_iterations,
            fallback_days: quantize(self.fallback_days),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct QuantizedSolverParams {
    window_start_days: i64,
    window_end_days: i64,
    tolerance_deg: i64,
    max_iterations: u32,
    fallback_days: i64,
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedPolicyParams {
    version: String,
    calibration_offset_deg: i64,
    design_arc_deg: i64,
    solver: QuantizedSolverParams,
    partner_policy: PartnerPolicy,
}

/// Kernel policy version 1.
///
/// ## Parameters
///
/// - `calibration_offset_deg`: ecliptic longitude of the wheel's zero point
/// - `design_arc_deg`: solar arc between design and birth
/// - `solver`: bisection window and limits
/// - `partner_policy`: how multi-partner gates are resolved by the analyzer
///   and the fixing calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Calibration offset in degrees.
    pub calibration_offset_deg: f64,
    /// Solar arc between design and birth, in degrees.
    pub design_arc_deg: f64,
    /// Solver limits.
    pub solver: SolverParams,
    /// Harmonic partner resolution.
    pub partner_policy: PartnerPolicy,
}

impl KernelPolicy {
    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the policy parameters.
    ///
    /// Floats are multiplied by 1e6 and rounded to i64 before hashing.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedPolicyParams {
        QuantizedPolicyParams {
            version: self.version.clone(),
            calibration_offset_deg: quantize(self.calibration_offset_deg),
            design_arc_deg: quantize(self.design_arc_deg),
            solver: self.solver.to_quantized(),
            partner_policy: self.partner_policy,
        }
    }

    /// A policy with a coarse tolerance and small iteration cap for tests.
    #[cfg(test)]
    pub fn minimal() -> Self {
        Self {
            solver: SolverParams {
                tolerance_deg: 0.01,
                max_iterations: 40,
                ..SolverParams::default()
            },
            ..Self::default()
        }
    }
}

impl Default for KernelPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            calibration_offset_deg: 3.875,
            design_arc_deg: 88.0,
            solver: SolverParams::default(),
            partner_policy: PartnerPolicy::AnyMatch,
        }
    }
}
