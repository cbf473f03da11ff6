//! Service middleware for request metrics.
//!
//! ## Metrics Exposed
//!
//! - `request_metric`: path, method, status and latency per request
//! - `chart_metric`: channel count, degraded flag and latency per computed chart
//!
//! Both are emitted as structured `tracing` events under the
//! `bodygraph_kernel::metrics` target, to be aggregated from logs.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Metrics middleware that records request counts and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        target: "bodygraph_kernel::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request_metric"
    );

    response
}

/// Record chart computation metrics.
pub fn record_chart_metrics(channel_count: usize, degraded: bool, latency_ms: u64) {
    info!(
        target: "bodygraph_kernel::metrics",
        metric_type = "chart",
        channel_count = channel_count,
        degraded = degraded,
        latency_ms = latency_ms,
        "chart_metric"
    );
}
