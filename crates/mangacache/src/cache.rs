//! Typed string-keyed cache

use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::stats::CacheStats;

/// Process-lifetime map from an opaque string key to a value of type `V`.
///
/// Readers share the lock; a writer holds it only for its single insert.
/// Entries are never evicted or expired.
pub struct Cache<V> {
    map: RwLock<HashMap<String, V, RandomState>>,
    stats: CacheStats,
}

impl<V: Clone> Cache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(RandomState::new())),
            stats: CacheStats::new(),
        }
    }

    /// Look up `key`, returning a clone of the stored value.
    ///
    /// Never performs I/O and never waits on anything but the read lock.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.map.read().get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.map.write().insert(key.into(), value);
        self.stats.record_insert();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Lookup counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_missing_key() {
        let cache: Cache<String> = Cache::new();

        assert_eq!(cache.get("nope"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_set_then_get() {
        let cache = Cache::new();
        cache.set("k", 1u32);

        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.stats().hits(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite() {
        let cache = Cache::new();
        cache.set("k", "v1".to_string());
        cache.set("k", "v2".to_string());

        assert_eq!(cache.get("k").as_deref(), Some("v2"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().inserts(), 2);
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = Cache::new();
        cache.set("a", 1);
        cache.set("b", 2);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), None);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(Cache::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.set(format!("{}-{}", t, i), i);
                        assert_eq!(cache.get(&format!("{}-{}", t, i)), Some(i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 800);
        assert_eq!(cache.stats().inserts(), 800);
    }
}
