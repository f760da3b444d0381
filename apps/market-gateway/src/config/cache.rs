//! Cache and throttle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::services::CacheConfig;

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds an entry is served without contacting a provider.
    #[serde(default = "default_fresh_ttl_secs")]
    pub fresh_ttl_secs: u64,
    /// Seconds an entry remains usable as a degradation fallback.
    #[serde(default = "default_stale_ttl_secs")]
    pub stale_ttl_secs: u64,
    /// Entry count that triggers an eviction sweep.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            fresh_ttl_secs: default_fresh_ttl_secs(),
            stale_ttl_secs: default_stale_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheSettings {
    /// Convert to the cache store's configuration.
    #[must_use]
    pub const fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            fresh_ttl: Duration::from_secs(self.fresh_ttl_secs),
            stale_ttl: Duration::from_secs(self.stale_ttl_secs),
            max_entries: self.max_entries,
        }
    }
}

/// Primary-provider throttle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleSettings {
    /// Minimum spacing between throttled provider calls, in milliseconds.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
        }
    }
}

impl ThrottleSettings {
    /// Minimum spacing.
    #[must_use]
    pub const fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }
}

const fn default_fresh_ttl_secs() -> u64 {
    30
}

const fn default_stale_ttl_secs() -> u64 {
    300
}

const fn default_max_entries() -> usize {
    200
}

const fn default_min_delay_ms() -> u64 {
    3000
}
