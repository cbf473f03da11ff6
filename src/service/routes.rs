//! Axum routes for the bodygraph service.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::kernel::{BodygraphReport, KernelError};
use crate::BODYGRAPH_SCHEMA_VERSION;

use super::middleware::record_chart_metrics;
use super::state::ServiceState;

/// Type alias for the shared service state.
pub type AppState = ServiceState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to compute a bodygraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRequest {
    /// Birth instant, RFC 3339 (e.g. `1990-01-01T12:00:00Z`).
    pub birth: String,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub tables_fingerprint: String,
    pub policy_params_hash: String,
    pub provider: String,
    /// Ephemeris cache usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheHealth>,
}

/// Ephemeris cache information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    pub len: usize,
    pub cap: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub cross_entries: usize,
    pub details: Option<String>,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&KernelError> for ErrorResponse {
    fn from(e: &KernelError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}

fn status_for(e: &KernelError) -> StatusCode {
    match e {
        KernelError::Validation(_) => StatusCode::BAD_REQUEST,
        KernelError::Ephemeris(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
        KernelError::Ephemeris(_) => StatusCode::BAD_GATEWAY,
        KernelError::Consistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Compute a bodygraph report for a birth instant.
async fn chart_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChartRequest>,
) -> Result<Json<BodygraphReport>, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();

    let report = state.kernel.compute_str(&request.birth).await.map_err(|e| {
        let body = ErrorResponse::from(&e);
        let body = if e.is_client_error() {
            body.with_details(request.birth.clone())
        } else {
            tracing::error!(error = %e, birth = %request.birth, "Chart computation failed");
            body
        };
        (status_for(&e), Json(body))
    })?;

    record_chart_metrics(
        report.analysis.channels.len(),
        report.precision.is_degraded(),
        start.elapsed().as_millis() as u64,
    );

    Ok(Json(report))
}

/// Health check endpoint (detailed).
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let kernel = &state.kernel;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: BODYGRAPH_SCHEMA_VERSION.to_string(),
        tables_fingerprint: kernel.tables().fingerprint().to_string(),
        policy_params_hash: kernel.policy().params_hash(),
        provider: state.provider_name().to_string(),
        cache: state.cache_stats().map(|s| CacheHealth {
            len: s.len,
            cap: s.cap,
            hits: s.hits,
            misses: s.misses,
        }),
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 if the process is alive. Does not check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Ready once the reference tables are loaded. A remote ephemeris outage
/// does not make the service unready: requests degrade to the analytic
/// provider instead.
async fn readiness_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let crosses = state.kernel.tables().crosses().len();
    if crosses > 0 {
        Ok(Json(ReadinessResponse {
            ready: true,
            cross_entries: crosses,
            details: None,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                cross_entries: 0,
                details: Some("Cross table is empty".to_string()),
            }),
        ))
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the bodygraph service.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/chart", post(chart_handler))
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(ServiceState::new(ServiceConfig::default()).unwrap())
    }

    async fn post_chart(birth: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({ "birth": birth }).to_string();
        let response = router()
            .oneshot(
                Request::post("/api/chart")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chart_endpoint() {
        let (status, json) = post_chart("1990-01-01T12:00:00Z").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["schema_version"], BODYGRAPH_SCHEMA_VERSION);
        assert_eq!(json["precision"]["level"], "exact");
        assert!(json["analysis"]["bodygraph_type"].is_string());
        assert_eq!(json["fingerprint"].as_str().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_chart_endpoint_rejects_bad_instant() {
        let (status, json) = post_chart("not a date").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_INSTANT");
        assert_eq!(json["details"], "not a date");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for path in ["/health", "/health/live", "/health/ready"] {
            let response = router()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", path);
        }
    }
}
