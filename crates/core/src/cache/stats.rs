use serde::{Deserialize, Serialize};

/// Point-in-time counters of a query cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Results written to the backend after a miss.
    pub stores: u64,
    /// Queries that failed and were therefore not cached.
    pub compute_failures: u64,
    /// Backend or serialization failures that forced a bypass.
    pub cache_errors: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, or `None` before any lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        (lookups > 0).then(|| self.hits as f64 / lookups as f64)
    }
}
