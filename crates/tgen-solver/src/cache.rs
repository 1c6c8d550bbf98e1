//! Least-recently-used memoization for inference and inhabitation results.
//!
//! Caches are explicit objects: an engine either creates one from its
//! configured capacity or is handed a shared one at construction, so several
//! engines (or several generation sessions) can share warm entries.
//!
//! Entries are pure functions of their keys. Two sessions that miss on the
//! same key concurrently both compute the value and the later insert wins;
//! that race is harmless.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded map evicting the least recently used entry.
///
/// Recency order is the insertion order of the underlying `IndexMap`: a hit
/// moves the entry to the back, eviction removes the front.
#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: IndexMap<K, V, FxBuildHasher>,
    capacity: usize,
    stats: CacheStats,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// A capacity of 0 disables the cache: inserts are dropped.
    pub fn new(capacity: usize) -> Self {
        LruCache {
            entries: IndexMap::with_capacity_and_hasher(capacity.min(1024), FxBuildHasher),
            capacity,
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.entries.get_index_of(key) {
            Some(index) => {
                self.stats.hits += 1;
                let last = self.entries.len() - 1;
                self.entries.move_index(index, last);
                self.entries.get_index(last).map(|(_, v)| v)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up without touching recency or statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(index) = self.entries.get_index_of(&key) {
            let last = self.entries.len() - 1;
            self.entries.move_index(index, last);
            if let Some((_, slot)) = self.entries.get_index_mut(last) {
                *slot = value;
            }
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
            self.stats.evictions += 1;
        }
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Thread-safe handle to an [`LruCache`], cheap to clone.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<LruCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        SharedCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Hash + Eq, V: Clone> SharedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        SharedCache {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    // A panic while holding the lock cannot leave an entry half-written, so a
    // poisoned cache is still usable.
    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether two handles share the same underlying cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
