//! Service state management.
//!
//! Holds the shared kernel and the provider stack it computes over.

use std::sync::Arc;
use tracing::{info, warn};

use crate::ephemeris::{
    AnalyticEphemeris, CacheStats, CachedEphemeris, EphemerisConfig, EphemerisProvider,
    FallbackEphemeris, RemoteEphemeris,
};
use crate::kernel::BodygraphKernel;
use crate::policy::KernelPolicy;
use crate::tables::ReferenceTables;
use crate::types::ConsistencyError;

/// Provider stack used by the service: an LRU over either a remote service
/// with analytic fallback, or the analytic provider alone.
pub type ServiceProvider = CachedEphemeris<Arc<dyn EphemerisProvider>>;

/// Service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Base URL of a remote ephemeris service. `None` selects the analytic provider.
    pub ephemeris_url: Option<String>,
    /// Timeout, retry and cache settings.
    pub ephemeris: EphemerisConfig,
    /// Kernel policy.
    pub policy: KernelPolicy,
}

impl ServiceConfig {
    /// Read configuration from the environment.
    ///
    /// - `EPHEMERIS_URL`: remote ephemeris base URL (unset: analytic only)
    /// - `EPHEMERIS_TIMEOUT_MS`: per-call timeout (default 2000)
    /// - `EPHEMERIS_RETRIES`: retries before falling back (default 1)
    /// - `EPHEMERIS_CACHE_ENTRIES`: LRU capacity (default 4096, 0 disables)
    pub fn from_env() -> Self {
        let defaults = EphemerisConfig::default();
        let parse = |key: &str| std::env::var(key).ok().and_then(|s| s.parse::<u64>().ok());

        let cache_entries = parse("EPHEMERIS_CACHE_ENTRIES")
            .map(|n| n as usize)
            .unwrap_or(defaults.cache_entries);

        Self {
            ephemeris_url: std::env::var("EPHEMERIS_URL").ok().filter(|s| !s.is_empty()),
            ephemeris: EphemerisConfig {
                timeout_ms: parse("EPHEMERIS_TIMEOUT_MS").unwrap_or(defaults.timeout_ms),
                retries: parse("EPHEMERIS_RETRIES")
                    .map(|n| n as u32)
                    .unwrap_or(defaults.retries),
                cache_entries,
                cache_enabled: cache_entries > 0,
            },
            policy: KernelPolicy::default(),
        }
    }
}

/// Shared service state.
#[derive(Clone)]
pub struct ServiceState {
    /// The kernel every request computes with.
    pub kernel: BodygraphKernel<ServiceProvider>,
    /// Remote ephemeris URL, if one is configured.
    pub ephemeris_url: Option<String>,
    cache_enabled: bool,
}

impl ServiceState {
    /// Build the provider stack and kernel.
    pub fn new(config: ServiceConfig) -> Result<Self, ConsistencyError> {
        let tables = Arc::new(ReferenceTables::builtin()?);

        let primary: Arc<dyn EphemerisProvider> = match &config.ephemeris_url {
            Some(url) => {
                info!(
                    url = %url,
                    timeout_ms = config.ephemeris.timeout_ms,
                    retries = config.ephemeris.retries,
                    "Using remote ephemeris with analytic fallback"
                );
                Arc::new(FallbackEphemeris::new(
                    RemoteEphemeris::new(url.clone()),
                    &config.ephemeris,
                ))
            }
            None => {
                warn!("EPHEMERIS_URL not set, using the analytic ephemeris only");
                Arc::new(AnalyticEphemeris)
            }
        };

        // A one-entry LRU stands in for "disabled": the solver never repeats
        // an instant back to back.
        let capacity = if config.ephemeris.cache_enabled {
            config.ephemeris.cache_entries
        } else {
            1
        };
        let provider = Arc::new(CachedEphemeris::new(primary, capacity));

        info!(
            tables_fingerprint = %tables.fingerprint(),
            policy_params_hash = %config.policy.params_hash(),
            "Reference tables loaded"
        );

        Ok(Self {
            kernel: BodygraphKernel::with_policy(provider, tables, config.policy),
            ephemeris_url: config.ephemeris_url,
            cache_enabled: config.ephemeris.cache_enabled,
        })
    }

    /// Build from environment variables.
    pub fn from_env() -> Result<Self, ConsistencyError> {
        Self::new(ServiceConfig::from_env())
    }

    /// Cache statistics, if the cache is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache_enabled
            .then(|| self.kernel.provider().cache_stats())
    }

    /// Name of the primary provider.
    pub fn provider_name(&self) -> &str {
        self.kernel.provider().name()
    }
}
