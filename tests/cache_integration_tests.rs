//! Integration Tests for the public cache API
//!
//! Exercises the cache through its public surface only, with the real clock
//! where wall-clock behavior matters.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use std::thread::{self, sleep};
use std::time::Duration;

use expiring_lru::cache::{Age, CacheBuilder, Clock, ExpiringCache, ManualClock};
use expiring_lru::CacheError;

// == Helper Functions ==

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "expiring_lru=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

fn letters(range: std::ops::RangeInclusive<char>) -> Vec<String> {
    range.map(|c| c.to_string()).collect()
}

// == Capacity ==

#[test]
fn test_capacity_scenario_eleven_keys_into_ten() {
    init_tracing();
    let cache = ExpiringCache::new(10, Age::from_secs(1)).unwrap();

    for (index, key) in letters('a'..='k').into_iter().enumerate() {
        cache.set(key, index, None).unwrap();
    }

    assert_eq!(cache.len(), 10);
    assert!(!cache.contains(&"a".to_string()));
    assert!(cache.contains(&"k".to_string()));

    assert_eq!(cache.remove(&"k".to_string()), Some(10));
    assert!(!cache.contains(&"k".to_string()));

    // Reading "b" promotes it, so the next least recent is "c"
    assert_eq!(cache.try_get(&"b".to_string()), Ok(1));
    assert_eq!(cache.pop_extreme(false), Some(("c".to_string(), 2)));
    assert!(cache.contains(&"b".to_string()));
    assert!(!cache.contains(&"c".to_string()));
}

#[test]
fn test_eviction_callback_receives_victim() {
    init_tracing();
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);
    let cache = CacheBuilder::new(Age::from_secs(60))
        .capacity(2)
        .callback(move |key: String, value: i32| sink.lock().unwrap().push((key, value)))
        .build()
        .unwrap();

    cache.set("x".to_string(), 1, None).unwrap();
    cache.set("y".to_string(), 2, None).unwrap();
    cache.set("x".to_string(), 3, None).unwrap();
    cache.set("z".to_string(), 4, None).unwrap();

    assert_eq!(*evicted.lock().unwrap(), vec![("y".to_string(), 2)]);
    assert_eq!(cache.get(&"x".to_string()), Some(3));
}

#[test]
fn test_expired_entry_gives_up_its_slot_before_live_eviction() {
    init_tracing();
    let clock = ManualClock::default();
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);
    let cache = CacheBuilder::new(Age::from_secs(60))
        .capacity(2)
        .clock(clock.clone())
        .callback(move |key: String, value: i32| sink.lock().unwrap().push((key, value)))
        .build()
        .unwrap();

    cache.set("live".to_string(), 1, Some(Age::from_secs(100))).unwrap();
    cache.set("dead".to_string(), 2, Some(Age::from_secs(1))).unwrap();
    clock.advance(Duration::from_secs(3));
    cache.set("new".to_string(), 3, None).unwrap();

    assert!(evicted.lock().unwrap().is_empty());
    assert!(cache.contains(&"live".to_string()));
    assert!(cache.contains(&"new".to_string()));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 0);
    assert_eq!(cache.stats().expirations, 1);
}

// == Expiry ==

#[test]
fn test_expiry_scenario_short_lived_key() {
    init_tracing();
    let cache = ExpiringCache::new(10, Age::from_secs(60)).unwrap();
    cache
        .set("x".to_string(), "value", Some(Age::from_secs(1)))
        .unwrap();

    assert_eq!(cache.get(&"x".to_string()), Some("value"));

    sleep(Duration::from_millis(1200));

    assert_eq!(cache.get(&"x".to_string()), None);
    assert!(!cache.contains(&"x".to_string()));
}

#[test]
fn test_lazy_deletion_without_explicit_sweep() {
    init_tracing();
    let cache = ExpiringCache::new(10, Age::try_from(0.3).unwrap()).unwrap();
    cache.set(1, "a", None).unwrap();
    cache.set(2, "b", Some(Age::from_secs(60))).unwrap();
    assert_eq!(cache.len(), 2);

    sleep(Duration::from_millis(400));

    assert_eq!(cache.len(), 1);
    assert!(!cache.contains(&1));
    assert_eq!(cache.keys(), vec![2]);
    assert!(matches!(cache.try_get(&1), Err(CacheError::NotFound(_))));
}

#[test]
fn test_mixed_ages_expire_in_order() {
    init_tracing();
    let clock = ManualClock::default();
    let cache = CacheBuilder::new(Age::from_secs(1))
        .capacity(10)
        .clock(clock.clone())
        .build()
        .unwrap();

    cache.set("a", 1, None).unwrap();
    cache.set("b", 2, Some(Age::from_secs(15))).unwrap();
    cache.set("c", 3, Some(Age::from(Duration::from_secs(60)))).unwrap();
    assert_eq!(cache.len(), 3);

    clock.advance(Duration::from_millis(500));
    assert_eq!(cache.len(), 3);

    clock.advance(Duration::from_millis(600));
    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(&"a"));
}

#[test]
fn test_refresh_scenario_never_shrinks() {
    init_tracing();
    let clock = ManualClock::default();
    let cache = CacheBuilder::new(Age::from_secs(1))
        .capacity(10)
        .clock(clock.clone())
        .build()
        .unwrap();
    let start = clock.now();

    cache.set("y", 1, Some(Age::from_secs(15))).unwrap();
    cache.set("c", 2, Some(Age::from_secs(60))).unwrap();
    clock.advance(Duration::from_millis(1100));

    let before = cache.ttl(&"y").unwrap();
    cache.refresh(&"y", None).unwrap();
    assert_eq!(cache.ttl(&"y").unwrap(), before);

    cache.refresh(&"c", Some(Age::from_secs(30))).unwrap();
    assert_eq!(
        cache.deadline_of(&"c"),
        Some(start + chrono::TimeDelta::seconds(60))
    );

    cache.refresh(&"y", Some(Age::from_secs(30))).unwrap();
    assert!(cache.ttl(&"y").unwrap() > Duration::from_secs(15));
}

// == Bulk Construction ==

#[test]
fn test_copy_scenario_keeps_live_entries_and_their_ttl() {
    init_tracing();
    let clock = ManualClock::default();
    let c1 = CacheBuilder::new(Age::from_secs(100))
        .capacity(10)
        .clock(clock.clone())
        .build()
        .unwrap();
    c1.set("expired", 0, Some(Age::from_secs(1))).unwrap();
    c1.set("live1", 1, Some(Age::from_secs(20))).unwrap();
    c1.set("live2", 2, Some(Age::from_secs(40))).unwrap();

    clock.advance(Duration::from_secs(5));
    let ttl1 = c1.ttl(&"live1").unwrap();
    let ttl2 = c1.ttl(&"live2").unwrap();

    let c2 = ExpiringCache::from_other_cache(&c1, None, None).unwrap();

    assert_eq!(c2.len(), 2);
    assert!(!c2.contains(&"expired"));
    assert_eq!(c2.ttl(&"live1"), Some(ttl1));
    assert_eq!(c2.ttl(&"live2"), Some(ttl2));
    assert_ne!(c2.ttl(&"live1"), Some(Duration::from_secs(100)));
}

#[test]
fn test_bulk_constructors() {
    init_tracing();
    let d1 = ExpiringCache::from_keys(vec!["a", "b", "c"], 1, 10u64, None).unwrap();
    assert_eq!(d1.len(), 3);

    let d2 = ExpiringCache::from_mapping(vec![("a", 1), ("b", 2), ("c", 3)], 10u64, None).unwrap();
    assert_eq!(d2.len(), 3);

    let d3 = ExpiringCache::from_other_cache(&d2, None, None).unwrap();
    assert_eq!(d3.len(), 3);
    assert_eq!(d3.get(&"b"), Some(2));
}

// == Clear ==

#[test]
fn test_clear_is_idempotent() {
    init_tracing();
    let cache = ExpiringCache::new(10, Age::from_secs(60)).unwrap();
    for key in letters('a'..='e') {
        cache.set(key, 0u8, None).unwrap();
    }

    cache.clear();
    cache.clear();

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
    for key in letters('a'..='e') {
        assert!(!cache.contains(&key));
    }
}

// == Concurrency ==

#[test]
fn test_concurrent_writers_keep_structure_intact() {
    init_tracing();
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;
    let cache = ExpiringCache::new(1000, Age::from_secs(60)).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let key = format!("t{}-{}", t, i);
                    cache.set(key.clone(), i, None).unwrap();
                    if i % 3 == 0 {
                        cache.get(&key);
                    }
                    if i % 7 == 0 {
                        cache.remove(&key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    assert!(cache.is_consistent());
    assert!(cache.len() <= 1000);
    let keys = cache.keys();
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
    assert_eq!(keys.len(), cache.len());
}

#[test]
fn test_concurrent_readers_and_expiry() {
    init_tracing();
    let cache = ExpiringCache::new(64, Age::from_millis(50)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..200u32 {
                    cache.set(i % 32, t, None).unwrap();
                    let _ = cache.len();
                    let _ = cache.ttl(&(i % 16));
                    if i % 50 == 0 {
                        sleep(Duration::from_millis(10));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    assert!(cache.is_consistent());
    sleep(Duration::from_millis(100));
    assert_eq!(cache.len(), 0);
}
