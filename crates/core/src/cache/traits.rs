use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key/value cache backend used to memoize query results.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value by key. Expired entries are reported as missing.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value with an optional TTL, outside of any group.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Sets a value and registers its key under `group` for later invalidation.
    async fn set_grouped(
        &self,
        group: &str,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> Result<()>;

    /// Deletes a value by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes all values whose key matches a glob pattern (e.g. `"consultas_*"`).
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    /// Deletes every value registered under `group`, returning how many were removed.
    async fn invalidate_group(&self, group: &str) -> Result<usize>;

    /// Deletes everything.
    async fn clear(&self) -> Result<()>;
}
