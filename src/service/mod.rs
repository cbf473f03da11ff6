//! Bodygraph REST Service
//!
//! Exposes the kernel as a REST API.
//!
//! ## Endpoints
//!
//! - `POST /api/chart` - Compute a bodygraph report for `{"birth": "<RFC 3339>"}`
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_chart_metrics};
pub use routes::{create_router, AppState, ChartRequest, ErrorResponse};
pub use state::{ServiceConfig, ServiceProvider, ServiceState};
