//! Timeout, retry and analytic fallback around a primary provider.
//!
//! Contract:
//!
//! 1. Each primary call is bounded by `timeout_ms`. A timeout counts as a
//!    transient failure.
//! 2. Transient failures are retried up to `retries` times.
//! 3. If the primary still fails transiently, the reading comes from
//!    [`AnalyticEphemeris`] and is marked `Precision::Degraded`.
//! 4. A `Protocol` error falls back the same way, without retrying.
//! 5. `OutOfRange` propagates unchanged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::warn;

use super::{AnalyticEphemeris, EphemerisConfig, EphemerisError, EphemerisProvider, Reading};
use crate::types::Body;

/// Fallback wrapper.
pub struct FallbackEphemeris<P> {
    primary: P,
    fallback: AnalyticEphemeris,
    timeout: Duration,
    retries: u32,
}

impl<P: EphemerisProvider> FallbackEphemeris<P> {
    /// Wrap a primary provider using timeout and retry settings from `config`.
    pub fn new(primary: P, config: &EphemerisConfig) -> Self {
        Self {
            primary,
            fallback: AnalyticEphemeris::new(),
            timeout: Duration::from_millis(config.timeout_ms),
            retries: config.retries,
        }
    }

    /// The wrapped primary provider.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    async fn try_primary(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError> {
        match tokio::time::timeout(self.timeout, self.primary.longitude(instant, body)).await {
            Ok(result) => result,
            Err(_) => Err(EphemerisError::Transient(format!(
                "timed out after {} ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl<P: EphemerisProvider> EphemerisProvider for FallbackEphemeris<P> {
    async fn longitude(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError> {
        let mut attempt = 0;
        let last_error = loop {
            match self.try_primary(instant, body).await {
                Ok(reading) => return Ok(reading),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        provider = self.primary.name(),
                        body = %body,
                        attempt,
                        error = %e,
                        "Ephemeris call failed, retrying"
                    );
                }
                Err(e @ EphemerisError::OutOfRange { .. }) => return Err(e),
                Err(e) => break e,
            }
        };

        warn!(
            provider = self.primary.name(),
            body = %body,
            instant = %instant,
            error = %last_error,
            "Ephemeris unavailable, using analytic approximation"
        );

        let longitude = self.fallback.compute(instant, body)?;
        Ok(Reading::degraded(
            longitude,
            format!(
                "{} ephemeris unavailable; analytic approximation used",
                self.primary.name()
            ),
        ))
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails transiently `failures` times, then answers 123.0.
    struct Scripted {
        failures: usize,
        calls: AtomicUsize,
        error: EphemerisError,
    }

    impl Scripted {
        fn new(failures: usize, error: EphemerisError) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
                error,
            }
        }
    }

    #[async_trait]
    impl EphemerisProvider for Scripted {
        async fn longitude(&self, _: DateTime<Utc>, _: Body) -> Result<Reading, EphemerisError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok(Reading::exact(123.0))
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl EphemerisProvider for Hanging {
        async fn longitude(&self, _: DateTime<Utc>, _: Body) -> Result<Reading, EphemerisError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap()
    }

    fn transient() -> EphemerisError {
        EphemerisError::Transient("connection reset".to_string())
    }

    #[tokio::test]
    async fn test_one_retry_recovers() {
        let provider = FallbackEphemeris::new(Scripted::new(1, transient()), &EphemerisConfig::default());
        let reading = provider.longitude(instant(), Body::Sun).await.unwrap();
        assert_eq!(reading, Reading::exact(123.0));
        assert_eq!(provider.primary().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_falls_back_after_retries() {
        let provider = FallbackEphemeris::new(Scripted::new(5, transient()), &EphemerisConfig::default());
        let reading = provider.longitude(instant(), Body::Sun).await.unwrap();

        assert!(reading.precision.is_degraded());
        assert_eq!(
            reading.longitude,
            AnalyticEphemeris.compute(instant(), Body::Sun).unwrap()
        );
        assert_eq!(provider.primary().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_protocol_error_falls_back_without_retry() {
        let provider = FallbackEphemeris::new(
            Scripted::new(5, EphemerisError::Protocol("success=false".into())),
            &EphemerisConfig::default(),
        );
        let reading = provider.longitude(instant(), Body::Sun).await.unwrap();

        assert!(reading.precision.is_degraded());
        assert_eq!(
            reading.longitude,
            AnalyticEphemeris.compute(instant(), Body::Sun).unwrap()
        );
        assert_eq!(provider.primary().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_propagates() {
        let out_of_range = EphemerisError::OutOfRange {
            body: Body::Sun,
            instant: instant(),
        };
        let provider = FallbackEphemeris::new(
            Scripted::new(5, out_of_range.clone()),
            &EphemerisConfig::default(),
        );
        let err = provider.longitude(instant(), Body::Sun).await.unwrap_err();
        assert_eq!(err, out_of_range);
        assert_eq!(provider.primary().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_transient() {
        let config = EphemerisConfig {
            timeout_ms: 50,
            ..EphemerisConfig::default()
        };
        let provider = FallbackEphemeris::new(Hanging, &config);
        let reading = provider.longitude(instant(), Body::Moon).await.unwrap();
        assert!(reading.precision.is_degraded());
        assert_eq!(
            reading.precision.reasons(),
            ["hanging ephemeris unavailable; analytic approximation used".to_string()]
        );
    }
}
