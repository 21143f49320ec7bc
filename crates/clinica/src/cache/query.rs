//! Read-through memoization of query results.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use clinica_core::cache::{decode_value, encode_value, Cache, CacheStats, QueryKey, TtlTable};

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    compute_failures: AtomicU64,
    cache_errors: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            compute_failures: self.compute_failures.load(Ordering::Relaxed),
            cache_errors: self.cache_errors.load(Ordering::Relaxed),
        }
    }
}

/// Invalidation counters. A result computed while its group was invalidated
/// is returned to the caller but not stored.
#[derive(Debug, Default)]
struct Generations {
    /// Bumped by `clear_all`.
    epoch: u64,
    groups: HashMap<String, u64>,
}

impl Generations {
    fn of(&self, group: &str) -> (u64, u64) {
        (self.epoch, self.groups.get(group).copied().unwrap_or_default())
    }
}

/// Memoizes query results in a [`Cache`] backend.
///
/// Cache problems never reach the caller: a failing backend or a stored
/// value that no longer decodes is logged and the query simply runs.
/// Query failures are returned unchanged and never stored.
///
/// Concurrent misses on the same key may each run the query; the last store
/// wins. A query that overlaps an invalidation of its group is not stored.
pub struct QueryCache {
    backend: Arc<dyn Cache>,
    ttls: TtlTable,
    counters: Counters,
    generations: RwLock<Generations>,
}

impl QueryCache {
    pub fn new(backend: Arc<dyn Cache>, ttls: TtlTable) -> Self {
        Self {
            backend,
            ttls,
            counters: Counters::default(),
            generations: RwLock::new(Generations::default()),
        }
    }

    /// Returns the cached value of `key`, or runs `compute` and stores its
    /// result for `ttl`.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &QueryKey,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cache_key = key.to_string();

        match self.backend.get(&cache_key).await {
            Ok(Some(bytes)) => match decode_value::<T>(&bytes) {
                Ok(value) => {
                    Counters::bump(&self.counters.hits);
                    tracing::trace!(key = %cache_key, "Cache hit");
                    return Ok(value);
                }
                // Written by an older shape of T - treat as cache miss
                Err(err) => {
                    Counters::bump(&self.counters.cache_errors);
                    tracing::warn!(key = %cache_key, error = %err, "Cached value did not decode, bypassing cache");
                }
            },
            Ok(None) => {}
            Err(err) => {
                Counters::bump(&self.counters.cache_errors);
                tracing::warn!(key = %cache_key, error = %err, "Cache read failed, bypassing cache");
            }
        }

        Counters::bump(&self.counters.misses);
        tracing::trace!(key = %cache_key, "Cache miss");

        let started = self.generations.read().await.of(key.group());
        let value = match compute().await {
            Ok(value) => value,
            Err(err) => {
                Counters::bump(&self.counters.compute_failures);
                return Err(err);
            }
        };

        // Held until the store lands so an invalidation cannot slip in between.
        let generations = self.generations.read().await;
        if generations.of(key.group()) != started {
            tracing::debug!(key = %cache_key, "Group invalidated during query, result not stored");
            return Ok(value);
        }

        match encode_value(&value) {
            Ok(bytes) => match self
                .backend
                .set_grouped(key.group(), &cache_key, &bytes, Some(ttl))
                .await
            {
                Ok(()) => {
                    Counters::bump(&self.counters.stores);
                    tracing::debug!(key = %cache_key, ttl_secs = ttl.as_secs(), "Stored query result");
                }
                Err(err) => {
                    Counters::bump(&self.counters.cache_errors);
                    tracing::warn!(key = %cache_key, error = %err, "Failed to store query result");
                }
            },
            Err(err) => {
                Counters::bump(&self.counters.cache_errors);
                tracing::warn!(key = %cache_key, error = %err, "Failed to encode query result");
            }
        }
        drop(generations);

        Ok(value)
    }

    /// [`get_or_compute`](Self::get_or_compute) with the TTL configured for
    /// `key` in the TTL table.
    pub async fn cached<T, E, F, Fut>(&self, key: &QueryKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ttl = self.ttls.ttl_for_key(key);
        self.get_or_compute(key, ttl, compute).await
    }

    /// Drops every cached result of `group`. Returns how many were removed;
    /// a backend failure is logged and reported as zero.
    pub async fn invalidate_group(&self, group: &str) -> usize {
        let mut generations = self.generations.write().await;
        *generations.groups.entry(group.to_string()).or_default() += 1;

        match self.backend.invalidate_group(group).await {
            Ok(removed) => {
                tracing::debug!(group, removed, "Invalidated cache group");
                removed
            }
            Err(err) => {
                Counters::bump(&self.counters.cache_errors);
                tracing::warn!(group, error = %err, "Failed to invalidate cache group");
                0
            }
        }
    }

    /// Drops every cached result.
    pub async fn clear_all(&self) {
        let mut generations = self.generations.write().await;
        generations.epoch += 1;
        generations.groups.clear();

        match self.backend.clear().await {
            Ok(()) => tracing::info!("Cleared query cache"),
            Err(err) => {
                Counters::bump(&self.counters.cache_errors);
                tracing::warn!(error = %err, "Failed to clear query cache");
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use clinica_core::cache::{groups, CacheError, Result as CacheResult};
    use serde::Deserialize;

    use super::*;
    use crate::cache::MemoryCache;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Fila {
        id: i64,
        nombre: String,
    }

    #[derive(Debug, PartialEq)]
    struct QueryFailed(&'static str);

    /// Backend whose every operation fails.
    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::Unavailable("down".to_string()))
        }
        async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
        async fn set_grouped(
            &self,
            _group: &str,
            _key: &str,
            _value: &[u8],
            _ttl: Option<Duration>,
        ) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
        async fn delete_pattern(&self, _pattern: &str) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
        async fn invalidate_group(&self, _group: &str) -> CacheResult<usize> {
            Err(CacheError::Unavailable("down".to_string()))
        }
        async fn clear(&self) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
    }

    fn memory() -> Arc<MemoryCache> {
        Arc::new(MemoryCache::new(NonZeroUsize::new(100).unwrap()))
    }

    fn query_cache(backend: Arc<dyn Cache>) -> QueryCache {
        QueryCache::new(backend, TtlTable::with_defaults(Duration::from_secs(300)))
    }

    fn filas() -> Vec<Fila> {
        vec![Fila {
            id: 1,
            nombre: "Luis Paz".to_string(),
        }]
    }

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let cache = query_cache(memory());
        let key = QueryKey::new(groups::CONSULTAS, "completas").param("limit", 50);
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let value: Result<Vec<Fila>, QueryFailed> = cache
                .get_or_compute(&key, TTL, move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(filas())
                })
                .await;
            assert_eq!(value.unwrap(), filas());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.stores), (2, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = query_cache(memory());
        let key = QueryKey::new(groups::HOY, "ingresos");
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let compute = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, QueryFailed>(42_i64)
        };

        cache.get_or_compute(&key, TTL, compute).await.unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        cache.get_or_compute(&key, TTL, compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.get_or_compute(&key, TTL, compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_different_params_are_isolated() {
        let cache = query_cache(memory());
        let ten = QueryKey::new(groups::CONSULTAS, "completas").param("limit", 10);
        let fifty = QueryKey::new(groups::CONSULTAS, "completas").param("limit", 50);

        let a: Result<i64, QueryFailed> = cache.get_or_compute(&ten, TTL, || async { Ok(10) }).await;
        let b: Result<i64, QueryFailed> =
            cache.get_or_compute(&fifty, TTL, || async { Ok(50) }).await;

        assert_eq!(a.unwrap(), 10);
        assert_eq!(b.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_invalidate_group_only_touches_that_group() {
        let backend = memory();
        let cache = query_cache(backend.clone());
        let consultas = QueryKey::new(groups::CONSULTAS, "hoy");
        let pacientes = QueryKey::new(groups::PACIENTES, "todos");

        cache
            .get_or_compute(&consultas, TTL, || async { Ok::<_, QueryFailed>(1) })
            .await
            .unwrap();
        cache
            .get_or_compute(&pacientes, TTL, || async { Ok::<_, QueryFailed>(2) })
            .await
            .unwrap();

        assert_eq!(cache.invalidate_group(groups::CONSULTAS).await, 1);

        assert!(backend.get(&consultas.to_string()).await.unwrap().is_none());
        assert!(backend.get(&pacientes.to_string()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_result_overlapping_invalidation_is_not_stored() {
        let backend = memory();
        let cache = query_cache(backend.clone());
        let key = QueryKey::new(groups::CONSULTAS, "detalle").param("id", 7);
        let calls = AtomicUsize::new(0);
        let (counter, shared) = (&calls, &cache);

        let compute = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            // A write to the group lands while the query is running.
            shared.invalidate_group(groups::CONSULTAS).await;
            Ok::<_, QueryFailed>(filas())
        };

        assert_eq!(cache.get_or_compute(&key, TTL, compute).await.unwrap(), filas());
        assert_eq!(cache.stats().stores, 0);
        assert!(backend.get(&key.to_string()).await.unwrap().is_none());

        cache
            .get_or_compute(&key, TTL, || async { Ok::<_, QueryFailed>(filas()) })
            .await
            .unwrap();
        assert_eq!(cache.stats().stores, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_during_query_skips_store() {
        let cache = query_cache(memory());
        let key = QueryKey::new(groups::MARCAS, "todas");
        let shared = &cache;

        cache
            .get_or_compute(&key, TTL, move || async move {
                shared.clear_all().await;
                Ok::<_, QueryFailed>(1_i64)
            })
            .await
            .unwrap();

        assert_eq!(cache.stats().stores, 0);
    }

    #[tokio::test]
    async fn test_invalidating_other_group_keeps_store() {
        let cache = query_cache(memory());
        let key = QueryKey::new(groups::PACIENTES, "todos");
        let shared = &cache;

        cache
            .get_or_compute(&key, TTL, move || async move {
                shared.invalidate_group(groups::CONSULTAS).await;
                Ok::<_, QueryFailed>(1_i64)
            })
            .await
            .unwrap();

        assert_eq!(cache.stats().stores, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_ttl_is_cached() {
        let cache = query_cache(memory());
        let key = QueryKey::new(groups::MARCAS, "todas");

        for _ in 0..2 {
            let value: Result<i64, QueryFailed> = cache
                .get_or_compute(&key, Duration::from_secs(u64::MAX), || async { Ok(9) })
                .await;
            assert_eq!(value, Ok(9));
        }

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.stores), (1, 1));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = query_cache(memory());
        let key = QueryKey::new(groups::LABORATORIO, "pendientes");

        let first: Result<i64, QueryFailed> = cache
            .get_or_compute(&key, TTL, || async { Err(QueryFailed("timeout")) })
            .await;
        assert_eq!(first, Err(QueryFailed("timeout")));

        let second: Result<i64, QueryFailed> =
            cache.get_or_compute(&key, TTL, || async { Ok(7) }).await;
        assert_eq!(second, Ok(7));

        let stats = cache.stats();
        assert_eq!(stats.compute_failures, 1);
        assert_eq!(stats.stores, 1);
    }

    #[tokio::test]
    async fn test_undecodable_value_is_bypassed_and_replaced() {
        let backend = memory();
        let cache = query_cache(backend.clone());
        let key = QueryKey::new(groups::FARMACIA, "stock");
        backend
            .set(&key.to_string(), b"not json", None)
            .await
            .unwrap();

        let value: Result<Vec<Fila>, QueryFailed> =
            cache.get_or_compute(&key, TTL, || async { Ok(filas()) }).await;

        assert_eq!(value.unwrap(), filas());
        assert_eq!(cache.stats().cache_errors, 1);
        let stored = backend.get(&key.to_string()).await.unwrap().unwrap();
        assert_eq!(decode_value::<Vec<Fila>>(&stored).unwrap(), filas());
    }

    #[tokio::test]
    async fn test_broken_backend_falls_through_to_query() {
        let cache = query_cache(Arc::new(BrokenCache));
        let key = QueryKey::new(groups::GASTOS, "mes");

        let value: Result<i64, QueryFailed> = cache.get_or_compute(&key, TTL, || async { Ok(5) }).await;
        assert_eq!(value, Ok(5));

        let failed: Result<i64, QueryFailed> = cache
            .get_or_compute(&key, TTL, || async { Err(QueryFailed("db down")) })
            .await;
        assert_eq!(failed, Err(QueryFailed("db down")));

        assert_eq!(cache.invalidate_group(groups::GASTOS).await, 0);
        cache.clear_all().await;
        assert_eq!(cache.stats().cache_errors, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_uses_ttl_table() {
        let cache = query_cache(memory());
        // "consultas_hoy" is configured for 60 seconds
        let key = QueryKey::new(groups::CONSULTAS, "hoy");
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let compute = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, QueryFailed>(3_i64)
        };

        cache.cached(&key, compute).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.cached(&key, compute).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let backend = memory();
        let cache = query_cache(backend.clone());
        let key = QueryKey::new(groups::MARCAS, "todas");
        cache
            .get_or_compute(&key, TTL, || async { Ok::<_, QueryFailed>(1) })
            .await
            .unwrap();

        cache.clear_all().await;

        assert!(backend.is_empty().await);
    }
}
