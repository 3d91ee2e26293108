//! In-memory query cache.
//!
//! Each entry holds one query result of any `Clone + Send + Sync` type,
//! a version that grows with every change, and a staleness flag. Writers
//! are the units that own a key; readers and listeners may be anyone.

use dashmap::DashMap;
use std::any::{type_name, Any};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::events::{CacheEvent, CacheEventKind, CacheListener};
use crate::keys::QueryKey;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Events buffered per key before slow listeners start skipping
    pub listener_buffer: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listener_buffer: 64,
        }
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    version: u64,
    stale: bool,
}

impl Entry {
    fn new<T: Send + Sync + 'static>(value: T, version: u64) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
            version,
            stale: false,
        }
    }
}

/// Keyed store of query results with listeners
pub struct QueryCache {
    config: CacheConfig,
    entries: DashMap<QueryKey, Entry>,
    listeners: DashMap<QueryKey, broadcast::Sender<CacheEvent>>,
    next_version: AtomicU64,
}

/// Shared handle to the cache
pub type SharedQueryCache = Arc<QueryCache>;

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    /// Create an empty cache with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create an empty cache
    #[must_use]
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
            listeners: DashMap::new(),
            next_version: AtomicU64::new(1),
        }
    }

    /// Create an empty cache behind an `Arc`
    #[must_use]
    pub fn shared() -> SharedQueryCache {
        Arc::new(Self::new())
    }

    fn bump(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::Relaxed)
    }

    /// Read a cached value
    ///
    /// Returns `None` when the key is absent or holds a different type.
    pub fn read<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.entries.get(key)?;
        if let Some(value) = entry.value.downcast_ref::<T>() {
            Some(value.clone())
        } else {
            tracing::warn!(
                key = %key,
                expected = type_name::<T>(),
                stored = entry.type_name,
                "Cache entry type mismatch"
            );
            None
        }
    }

    /// Store a value, replacing any previous one, and return its version
    pub fn write<T>(&self, key: QueryKey, value: T) -> u64
    where
        T: Send + Sync + 'static,
    {
        let version = self.bump();
        self.entries.insert(key.clone(), Entry::new(value, version));
        tracing::trace!(key = %key, version, "Cache write");
        self.notify(key, CacheEventKind::Written, version);
        version
    }

    /// Patch a cached value in place
    ///
    /// The patch runs while the key is locked, so concurrent patches of one
    /// key are applied one after another. Returns the new version, or `None`
    /// when the key is absent or holds a different type.
    pub fn update<T, F>(&self, key: &QueryKey, patch: F) -> Option<u64>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut T),
    {
        self.update_if(key, |value: &mut T| {
            patch(value);
            true
        })
    }

    /// Patch a cached value when `patch` reports a change
    ///
    /// `patch` returns whether it modified the value; an unchanged value keeps
    /// its version and raises no event.
    pub fn update_if<T, F>(&self, key: &QueryKey, patch: F) -> Option<u64>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut T) -> bool,
    {
        let version = {
            let mut entry = self.entries.get_mut(key)?;
            let Some(current) = entry.value.downcast_ref::<T>() else {
                tracing::warn!(
                    key = %key,
                    expected = type_name::<T>(),
                    stored = entry.type_name,
                    "Cache entry type mismatch on update"
                );
                return None;
            };
            let mut next = current.clone();
            if !patch(&mut next) {
                return None;
            }
            let version = self.bump();
            entry.value = Arc::new(next);
            entry.version = version;
            version
        };
        self.notify(key.clone(), CacheEventKind::Written, version);
        Some(version)
    }

    /// Apply `patch` to every entry of a resource; returns the keys that changed
    pub fn update_resource<T, F>(&self, resource: &str, mut patch: F) -> Vec<QueryKey>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut(&mut T) -> bool,
    {
        self.keys_for_resource(resource)
            .into_iter()
            .filter(|key| self.update_if::<T, _>(key, &mut patch).is_some())
            .collect()
    }

    /// Mark an entry stale; returns false if the key is absent
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let version = {
            let Some(mut entry) = self.entries.get_mut(key) else {
                return false;
            };
            entry.stale = true;
            entry.version
        };
        tracing::debug!(key = %key, "Cache invalidate");
        self.notify(key.clone(), CacheEventKind::Invalidated, version);
        true
    }

    /// Mark every entry of a resource stale; returns how many were marked
    pub fn invalidate_resource(&self, resource: &str) -> usize {
        self.keys_for_resource(resource)
            .iter()
            .filter(|key| self.invalidate(key))
            .count()
    }

    /// Drop an entry; returns false if the key is absent
    pub fn remove(&self, key: &QueryKey) -> bool {
        match self.entries.remove(key) {
            Some((key, entry)) => {
                self.notify(key, CacheEventKind::Removed, entry.version);
                true
            }
            None => false,
        }
    }

    /// Keys currently cached for a resource
    pub fn keys_for_resource(&self, resource: &str) -> Vec<QueryKey> {
        self.entries
            .iter()
            .filter(|entry| entry.key().resource() == resource)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Whether the key needs a fetch (absent or invalidated)
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_none_or(|entry| entry.stale)
    }

    /// Check if a value is cached under the key
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Current version of an entry
    pub fn version(&self, key: &QueryKey) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.version)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Listen to changes of one key
    pub fn subscribe(&self, key: QueryKey) -> CacheListener {
        let rx = self
            .listeners
            .entry(key.clone())
            .or_insert_with(|| broadcast::channel(self.config.listener_buffer).0)
            .subscribe();
        CacheListener::new(key, rx)
    }

    fn notify(&self, key: QueryKey, kind: CacheEventKind, version: u64) {
        let delivered = match self.listeners.get(&key) {
            Some(tx) => tx
                .send(CacheEvent {
                    key: key.clone(),
                    kind,
                    version,
                })
                .is_ok(),
            None => return,
        };
        if !delivered {
            self.listeners.remove_if(&key, |_, tx| tx.receiver_count() == 0);
        }
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
