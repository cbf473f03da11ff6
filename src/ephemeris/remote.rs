//! HTTP ephemeris service client.
//!
//! Protocol: `POST {base_url}/longitude` with
//! `{"date": "<RFC 3339>", "body": "Sun"}`, answered by
//! `{"success": true, "longitude": 280.81}` or
//! `{"success": false, "error": "..."}`.
//!
//! Connection failures, timeouts and 5xx responses are `Transient`; 4xx
//! responses and malformed payloads are `Protocol`. Wrap this provider in
//! [`FallbackEphemeris`](super::FallbackEphemeris) to get retries and the
//! analytic fallback.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EphemerisError, EphemerisProvider, Reading};
use crate::mapper::normalize_degrees;
use crate::types::Body;

#[derive(Debug, Serialize)]
struct LongitudeRequest<'a> {
    date: String,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct LongitudeResponse {
    success: bool,
    longitude: Option<f64>,
    error: Option<String>,
}

/// Remote ephemeris provider.
#[derive(Debug, Clone)]
pub struct RemoteEphemeris {
    client: Client,
    base_url: String,
}

impl RemoteEphemeris {
    /// Create a client for a service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create with a preconfigured HTTP client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn query(&self, instant: DateTime<Utc>, body: Body) -> Result<f64, EphemerisError> {
        let url = format!("{}/longitude", self.base_url.trim_end_matches('/'));
        let request = LongitudeRequest {
            date: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            body: body.as_str(),
        };

        let res = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EphemerisError::Transient(e.to_string()))?;

        let status = res.status();
        if status.is_server_error() {
            return Err(EphemerisError::Transient(format!("server returned {}", status)));
        }
        if !status.is_success() {
            return Err(EphemerisError::Protocol(format!("server returned {}", status)));
        }

        let payload: LongitudeResponse = res
            .json()
            .await
            .map_err(|e| EphemerisError::Protocol(e.to_string()))?;

        match payload {
            LongitudeResponse {
                success: true,
                longitude: Some(longitude),
                ..
            } if longitude.is_finite() => Ok(longitude),
            LongitudeResponse { success: true, .. } => Err(EphemerisError::Protocol(
                "response has no finite longitude".to_string(),
            )),
            LongitudeResponse { error, .. } => Err(EphemerisError::Protocol(
                error.unwrap_or_else(|| "unspecified service error".to_string()),
            )),
        }
    }
}

#[async_trait]
impl EphemerisProvider for RemoteEphemeris {
    async fn longitude(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError> {
        let longitude = match body.mirror_of() {
            Some(source) => normalize_degrees(self.query(instant, source).await? + 180.0),
            None => normalize_degrees(self.query(instant, body).await?),
        };
        Ok(Reading::exact(longitude))
    }

    fn name(&self) -> &str {
        "remote"
    }
}
