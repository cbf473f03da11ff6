//! LRU cache in front of any provider.
//!
//! The solver asks for the Sun at many nearby instants and the service may
//! see repeated birth instants, so readings are cached by (instant, body) at
//! full nanosecond resolution.
//! Only exact readings are cached: a degraded reading must not outlive the
//! outage that produced it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{EphemerisProvider, EphemerisError, Reading};
use crate::types::Body;

const DEFAULT_CAPACITY: usize = 4_096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    seconds: i64,
    nanos: u32,
    body: Body,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups forwarded to the inner provider.
    pub misses: u64,
}

/// Caching wrapper.
pub struct CachedEphemeris<P> {
    inner: P,
    cache: Arc<RwLock<LruCache<CacheKey, f64>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: EphemerisProvider> CachedEphemeris<P> {
    /// Wrap a provider with an LRU of `capacity` entries.
    pub fn new(inner: P, capacity: usize) -> Self {
        let size = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Arc::new(RwLock::new(LruCache::new(size))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.read();
        CacheStats {
            len: cache.len(),
            cap: cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Clear the cache.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}

#[async_trait]
impl<P: EphemerisProvider> EphemerisProvider for CachedEphemeris<P> {
    async fn longitude(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError> {
        let key = CacheKey {
            seconds: instant.timestamp(),
            nanos: instant.timestamp_subsec_nanos(),
            body,
        };

        // peek() does not touch recency, so a read lock is enough
        let cached = self.cache.read().peek(&key).copied();
        if let Some(longitude) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Reading::exact(longitude));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let reading = self.inner.longitude(instant, body).await?;
        if !reading.precision.is_degraded() {
            self.cache.write().put(key, reading.longitude);
        }
        Ok(reading)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
