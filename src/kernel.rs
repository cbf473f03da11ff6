//! The bodygraph kernel: birth instant in, report out.
//!
//! ```text
//! birth ─▶ ChartAssembler ─▶ Chart ─┬─▶ BodygraphAnalyzer ─▶ BodygraphAnalysis
//!              │                    ├─▶ CrossClassifier   ─▶ IncarnationCross
//!        DesignSolver               └─▶ FixingCalculator  ─▶ ChartFixing
//! ```
//!
//! The kernel owns its provider and tables behind `Arc`, so one instance can
//! be shared across tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analyzer::BodygraphAnalyzer;
use crate::assembler::ChartAssembler;
use crate::canonical::canonical_hash_hex;
use crate::cross::CrossClassifier;
use crate::ephemeris::{EphemerisError, EphemerisProvider};
use crate::fixing::FixingCalculator;
use crate::policy::KernelPolicy;
use crate::solver::DesignMoment;
use crate::tables::ReferenceTables;
use crate::types::{
    BodygraphAnalysis, Chart, ChartFixing, ConsistencyError, IncarnationCross, Precision,
    ValidationError,
};
use crate::BODYGRAPH_SCHEMA_VERSION;

/// Error type for kernel operations.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// The input was rejected before computation started.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// The ephemeris provider failed and no fallback absorbed it.
    #[error("Ephemeris error: {0}")]
    Ephemeris(#[from] EphemerisError),
    /// Reference data is inconsistent (should never happen with built-in tables).
    #[error("Internal consistency error: {0}")]
    Consistency(#[from] ConsistencyError),
}

impl KernelError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::InvalidInstant { .. }) => "INVALID_INSTANT",
            Self::Validation(ValidationError::InstantOutOfRange { .. }) => "INSTANT_OUT_OF_RANGE",
            Self::Validation(_) => "INVALID_INPUT",
            Self::Ephemeris(e) if e.is_transient() => "EPHEMERIS_UNAVAILABLE",
            Self::Ephemeris(_) => "EPHEMERIS_FAILED",
            Self::Consistency(_) => "INTERNAL_CONSISTENCY",
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Everything computed for one birth instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodygraphReport {
    /// Report schema version.
    pub schema_version: String,
    /// Hash over tables, policy and every computed field.
    pub fingerprint: String,
    /// Fingerprint of the reference tables used.
    pub tables_fingerprint: String,
    /// Policy identifier.
    pub policy_id: String,
    /// Policy parameters hash.
    pub policy_params_hash: String,
    /// Both chart sides.
    pub chart: Chart,
    /// How the design instant was found.
    pub design_moment: DesignMoment,
    /// Type, authority, profile, definition.
    pub analysis: BodygraphAnalysis,
    /// Incarnation cross.
    pub cross: IncarnationCross,
    /// Fixing annotations per side.
    pub fixing: ChartFixing,
    /// Degraded if any stage fell back.
    pub precision: Precision,
}

/// Fields covered by the report fingerprint.
#[derive(Serialize)]
struct ReportDigest<'a> {
    schema_version: &'a str,
    tables_fingerprint: &'a str,
    policy_params_hash: &'a str,
    chart: &'a Chart,
    design_moment: &'a DesignMoment,
    analysis: &'a BodygraphAnalysis,
    cross: &'a IncarnationCross,
    fixing: &'a ChartFixing,
}

/// Birth-to-bodygraph pipeline over an ephemeris provider.
pub struct BodygraphKernel<P: EphemerisProvider + ?Sized> {
    provider: Arc<P>,
    tables: Arc<ReferenceTables>,
    policy: KernelPolicy,
}

impl<P: EphemerisProvider + ?Sized> Clone for BodygraphKernel<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            tables: Arc::clone(&self.tables),
            policy: self.policy.clone(),
        }
    }
}

impl<P: EphemerisProvider + ?Sized> BodygraphKernel<P> {
    /// Create a kernel with the default policy.
    pub fn new(provider: Arc<P>, tables: Arc<ReferenceTables>) -> Self {
        Self::with_policy(provider, tables, KernelPolicy::default())
    }

    /// Create a kernel with an explicit policy.
    pub fn with_policy(provider: Arc<P>, tables: Arc<ReferenceTables>, policy: KernelPolicy) -> Self {
        Self {
            provider,
            tables,
            policy,
        }
    }

    /// The ephemeris provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The reference tables.
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// The active policy.
    pub fn policy(&self) -> &KernelPolicy {
        &self.policy
    }

    /// Compute the report for an RFC 3339 birth instant.
    pub async fn compute_str(&self, birth: &str) -> Result<BodygraphReport, KernelError> {
        let parsed = DateTime::parse_from_rfc3339(birth).map_err(|e| ValidationError::InvalidInstant {
            input: birth.to_string(),
            reason: e.to_string(),
        })?;
        self.compute(parsed.with_timezone(&Utc)).await
    }

    /// Compute the report for a birth instant.
    pub async fn compute(&self, birth: DateTime<Utc>) -> Result<BodygraphReport, KernelError> {
        let (chart, design_moment) = ChartAssembler::new(&*self.provider, &self.tables, &self.policy)
            .assemble(birth)
            .await?;

        let analysis =
            BodygraphAnalyzer::new(&self.tables, self.policy.partner_policy).analyze(&chart)?;
        let cross = CrossClassifier::new(&self.tables).classify(&chart);
        let fixing =
            FixingCalculator::new(&self.tables, self.policy.partner_policy).annotate_chart(&chart);

        let precision = chart.precision.clone();
        let policy_params_hash = self.policy.params_hash();

        let fingerprint = canonical_hash_hex(&ReportDigest {
            schema_version: BODYGRAPH_SCHEMA_VERSION,
            tables_fingerprint: self.tables.fingerprint(),
            policy_params_hash: &policy_params_hash,
            chart: &chart,
            design_moment: &design_moment,
            analysis: &analysis,
            cross: &cross,
            fixing: &fixing,
        });

        if precision.is_degraded() {
            warn!(
                birth = %birth,
                provider = self.provider.name(),
                reasons = ?precision.reasons(),
                "Bodygraph computed with degraded precision"
            );
        }

        info!(
            birth = %birth,
            design = %design_moment.instant,
            bodygraph_type = %analysis.bodygraph_type,
            profile = %analysis.profile,
            cross = %cross,
            fingerprint = %fingerprint,
            "Bodygraph computed"
        );

        Ok(BodygraphReport {
            schema_version: BODYGRAPH_SCHEMA_VERSION.to_string(),
            fingerprint,
            tables_fingerprint: self.tables.fingerprint().to_string(),
            policy_id: self.policy.policy_id().to_string(),
            policy_params_hash,
            chart,
            design_moment,
            analysis,
            cross,
            fixing,
            precision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{AnalyticEphemeris, EphemerisConfig, FallbackEphemeris, Reading};
    use crate::types::Body;
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn analytic_kernel() -> BodygraphKernel<AnalyticEphemeris> {
        BodygraphKernel::new(
            Arc::new(AnalyticEphemeris),
            Arc::new(ReferenceTables::builtin().unwrap()),
        )
    }

    struct Unreachable;

    #[async_trait]
    impl EphemerisProvider for Unreachable {
        async fn longitude(&self, _instant: DateTime<Utc>, _body: Body) -> Result<Reading, EphemerisError> {
            Err(EphemerisError::Transient("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    struct Refusing;

    #[async_trait]
    impl EphemerisProvider for Refusing {
        async fn longitude(&self, _instant: DateTime<Utc>, _body: Body) -> Result<Reading, EphemerisError> {
            Err(EphemerisError::Protocol("success=false: calculation failed".to_string()))
        }

        fn name(&self) -> &str {
            "refusing"
        }
    }

    #[tokio::test]
    async fn test_compute_full_report() {
        let kernel = analytic_kernel();
        let birth = Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap();
        let report = kernel.compute(birth).await.unwrap();

        assert_eq!(report.schema_version, BODYGRAPH_SCHEMA_VERSION);
        assert_eq!(report.precision, Precision::Exact);
        assert!(report.design_moment.converged);
        assert_eq!(report.fixing.personality.len(), 13);
        assert_eq!(report.fixing.design.len(), 13);
        assert_eq!(report.policy_params_hash, KernelPolicy::default().params_hash());
        assert_eq!(report.tables_fingerprint, kernel.tables().fingerprint());

        let days = (birth - report.chart.design_instant).num_days();
        assert!((85..=92).contains(&days), "design offset {} days", days);
    }

    #[tokio::test]
    async fn test_fingerprint_is_deterministic() {
        let kernel = analytic_kernel();
        let a = kernel.compute_str("1985-06-15T08:30:00Z").await.unwrap();
        let b = kernel.compute_str("1985-06-15T10:30:00+02:00").await.unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a, b);

        let c = kernel.compute_str("1985-06-16T08:30:00Z").await.unwrap();
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[tokio::test]
    async fn test_invalid_instant_rejected() {
        let err = analytic_kernel().compute_str("yesterday").await.unwrap_err();
        assert!(matches!(
            err,
            KernelError::Validation(ValidationError::InvalidInstant { .. })
        ));
        assert_eq!(err.code(), "INVALID_INSTANT");
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_out_of_range_rejected() {
        let err = analytic_kernel()
            .compute_str("1700-01-01T00:00:00Z")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INSTANT_OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn test_birth_near_range_start_is_client_error() {
        let err = analytic_kernel()
            .compute_str("1800-02-01T00:00:00Z")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INSTANT_OUT_OF_RANGE");
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_unreachable_provider_degrades_report() {
        let config = EphemerisConfig {
            timeout_ms: 200,
            retries: 1,
            ..EphemerisConfig::default()
        };
        let provider = FallbackEphemeris::new(Unreachable, &config);
        let kernel = BodygraphKernel::new(
            Arc::new(provider),
            Arc::new(ReferenceTables::builtin().unwrap()),
        );
        let birth = Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap();

        let degraded = kernel.compute(birth).await.unwrap();
        let exact = analytic_kernel().compute(birth).await.unwrap();

        assert!(degraded.precision.is_degraded());
        assert!(degraded.precision.reasons()[0].contains("unreachable"));
        // Same analytic values underneath, so the classification agrees.
        assert_eq!(degraded.analysis, exact.analysis);
        assert_eq!(degraded.cross, exact.cross);
        assert_ne!(degraded.fingerprint, exact.fingerprint);
    }

    #[tokio::test]
    async fn test_protocol_failure_degrades_report() {
        let provider = FallbackEphemeris::new(Refusing, &EphemerisConfig::default());
        let kernel = BodygraphKernel::new(
            Arc::new(provider),
            Arc::new(ReferenceTables::builtin().unwrap()),
        );
        let birth = Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap();

        let report = kernel.compute(birth).await.unwrap();
        let exact = analytic_kernel().compute(birth).await.unwrap();

        assert!(report.precision.is_degraded());
        assert!(report.precision.reasons()[0].contains("refusing"));
        assert_eq!(report.analysis, exact.analysis);
    }

    #[tokio::test]
    async fn test_dyn_provider() {
        let provider: Arc<dyn EphemerisProvider> = Arc::new(AnalyticEphemeris);
        let kernel = BodygraphKernel::new(provider, Arc::new(ReferenceTables::builtin().unwrap()));
        let report = kernel.compute_str("2000-01-01T12:00:00Z").await.unwrap();
        assert_eq!(kernel.provider().name(), "analytic");
        assert!(!report.analysis.activated_gates.is_empty());
    }
}
