use super::*;
use rayon::prelude::*;

#[test]
fn test_evicts_least_recently_used() {
    let mut cache = LruCache::new(2);
    cache.insert("a", 1);
    cache.insert("b", 2);
    // Touch `a` so `b` becomes the eviction candidate.
    assert_eq!(cache.get(&"a"), Some(&1));
    cache.insert("c", 3);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.peek(&"a"), Some(&1));
    assert_eq!(cache.peek(&"b"), None);
    assert_eq!(cache.peek(&"c"), Some(&3));
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_reinsert_refreshes_recency_and_value() {
    let mut cache = LruCache::new(2);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("a", 10);
    cache.insert("c", 3);

    assert_eq!(cache.peek(&"a"), Some(&10));
    assert_eq!(cache.peek(&"b"), None);
}

#[test]
fn test_peek_does_not_touch_recency_or_stats() {
    let mut cache = LruCache::new(2);
    cache.insert(1, "one");
    cache.insert(2, "two");
    assert_eq!(cache.peek(&1), Some(&"one"));
    cache.insert(3, "three");

    assert_eq!(cache.peek(&1), None);
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 0,
            misses: 0,
            evictions: 1,
        }
    );
}

#[test]
fn test_zero_capacity_disables_cache() {
    let mut cache = LruCache::new(0);
    cache.insert("a", 1);
    assert!(cache.is_empty());
    assert_eq!(cache.get(&"a"), None);
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(cache.capacity(), 0);
}

#[test]
fn test_hit_rate() {
    let mut cache = LruCache::new(4);
    assert_eq!(cache.stats().hit_rate(), 0.0);
    cache.insert("k", 1);
    cache.get(&"k");
    cache.get(&"k");
    cache.get(&"k");
    cache.get(&"missing");
    assert_eq!(cache.stats().hits, 3);
    assert_eq!(cache.stats().misses, 1);
    assert!((cache.stats().hit_rate() - 0.75).abs() < f64::EPSILON);
}

#[test]
fn test_clear_keeps_stats() {
    let mut cache = LruCache::new(4);
    cache.insert(1, 1);
    cache.get(&1);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_shared_handles_see_same_entries() {
    let cache: SharedCache<u64, String> = SharedCache::new(8);
    let other = cache.clone();
    cache.insert(7, "seven".to_string());

    assert!(cache.ptr_eq(&other));
    assert_eq!(other.get(&7), Some("seven".to_string()));
    assert_eq!(other.len(), 1);

    let fresh: SharedCache<u64, String> = SharedCache::new(8);
    assert!(!fresh.ptr_eq(&cache));
    assert!(fresh.is_empty());
}

#[test]
fn test_shared_cache_concurrent_access() {
    let cache: SharedCache<u64, u64> = SharedCache::new(64);
    (0..1_000u64).into_par_iter().for_each(|i| {
        let key = i % 100;
        if cache.get(&key).is_none() {
            cache.insert(key, key * 2);
        }
    });

    assert!(cache.len() <= 64);
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 1_000);
    // Every surviving entry holds the value computed for its key.
    for key in 0..100u64 {
        if let Some(value) = cache.get(&key) {
            assert_eq!(value, key * 2);
        }
    }
}
