//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using tokio
//! synchronization primitives and LRU eviction policy.
//!
//! Keys stored with `set_grouped` are tracked per group so a whole group can
//! be dropped without scanning the store. Tracking is kept in step with the
//! store: overwritten, evicted, expired and deleted keys leave their group.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;

use clinica_core::cache::{group_pattern, pattern_matches, Cache, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
    group: Option<String>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>, group: Option<String>) -> Self {
        // An expiry past what `Instant` can represent never expires.
        let expires_at = ttl.and_then(|d| Instant::now().checked_add(d));
        Self {
            value,
            expires_at,
            group,
        }
    }

    /// Returns true if this entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Store and group tracking, guarded together.
#[derive(Debug)]
struct Inner {
    entries: LruCache<String, CacheEntry>,
    /// Maps group -> set of cache keys.
    groups: HashMap<String, HashSet<String>>,
}

impl Inner {
    fn insert(&mut self, key: String, entry: CacheEntry) {
        let group = entry.group.clone();

        // `push` hands back either the previous value of `key` or the LRU
        // victim; both must leave their group.
        if let Some((old_key, old)) = self.entries.push(key.clone(), entry) {
            self.untrack(old.group.as_deref(), &old_key);
        }

        if let Some(group) = group {
            self.groups.entry(group).or_default().insert(key);
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.entries.pop(key) {
            Some(entry) => {
                self.untrack(entry.group.as_deref(), key);
                true
            }
            None => false,
        }
    }

    fn untrack(&mut self, group: Option<&str>, key: &str) {
        let Some(group) = group else {
            return;
        };
        if let Some(keys) = self.groups.get_mut(group) {
            keys.remove(key);
            // Clean up empty tracking sets
            if keys.is_empty() {
                self.groups.remove(group);
            }
        }
    }

    fn remove_matching(&mut self, pattern: &str) -> usize {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| pattern_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();

        keys.iter().filter(|key| self.remove(key)).count()
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<_>>` for concurrent access. Expired
/// entries are removed lazily, when they are next read. Uses LRU eviction to
/// bound memory once `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache holding at most `max_entries` entries.
    pub fn new(max_entries: NonZeroUsize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries: LruCache::new(max_entries),
                groups: HashMap::new(),
            })),
        }
    }

    /// Number of stored entries, including expired ones not yet read.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // Write lock: a read promotes the entry in the LRU order.
        let mut inner = self.inner.write().await;

        match inner.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }

        inner.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry::new(value.to_vec(), ttl, None);
        self.inner.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_grouped(
        &self,
        group: &str,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> Result<()> {
        let entry = CacheEntry::new(value.to_vec(), ttl, Some(group.to_string()));
        self.inner.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().await.remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        self.inner.write().await.remove_matching(pattern);
        Ok(())
    }

    async fn invalidate_group(&self, group: &str) -> Result<usize> {
        let mut inner = self.inner.write().await;

        let tracked = inner.groups.remove(group).unwrap_or_default();
        let mut removed = tracked
            .iter()
            .filter(|key| inner.entries.pop(*key).is_some())
            .count();

        // Keys written with plain `set` under the group's prefix.
        removed += inner.remove_matching(&group_pattern(group));

        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.groups.clear();
        Ok(())
    }
}
