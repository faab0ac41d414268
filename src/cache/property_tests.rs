//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain `HashMap` model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{shard_index, Cache, SHARD_COUNT};

// == Test Configuration ==
// Large enough that no sweep runs while a case executes
const TEST_CAPACITY: usize = 100_000;
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates cache keys, including the empty key
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{0,32}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Remove { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => Just(CacheOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any sequence of operations without expiry or eviction behaves like a map,
    // and the approximate count is exact in a single thread.
    #[test]
    fn prop_matches_hashmap_model(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let cache = Cache::new(TEST_CAPACITY, TEST_TTL);
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value.clone());
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).cloned());
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key), model.remove(&key).is_some());
                    prop_assert_eq!(cache.get(&key), None);
                }
                CacheOp::Clear => {
                    cache.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(cache.len(), model.len());
        }
    }

    // Keys that were never stored are never found.
    #[test]
    fn prop_unknown_key_is_absent(
        stored in prop::collection::hash_set(key_strategy(), 0..50),
        missing in key_strategy()
    ) {
        prop_assume!(!stored.contains(&missing));
        let cache = Cache::new(TEST_CAPACITY, TEST_TTL);
        for key in &stored {
            cache.set(key.clone(), 1u8);
        }

        prop_assert_eq!(cache.get(&missing), None);
    }

    // Routing is deterministic and lands inside the shard array.
    #[test]
    fn prop_routing_is_stable(key in ".{0,64}") {
        let first = shard_index(&key, SHARD_COUNT);
        prop_assert!(first < SHARD_COUNT);
        prop_assert_eq!(first, shard_index(&key, SHARD_COUNT));
    }

    // A successful load is cached; a later fetch is served without the loader.
    #[test]
    fn prop_fetch_caches_loaded_value(key in key_strategy(), value in value_strategy()) {
        let cache = Cache::new(TEST_CAPACITY, TEST_TTL);

        let loaded: Result<_, ()> = cache.fetch(&key, |_| Ok(Some(value.clone())));
        prop_assert_eq!(loaded, Ok(Some(value.clone())));

        let cached: Result<_, ()> = cache.fetch(&key, |_| panic!("loader called on a hit"));
        prop_assert_eq!(cached, Ok(Some(value.clone())));
        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // A failed load leaves the cache untouched.
    #[test]
    fn prop_fetch_failure_caches_nothing(key in key_strategy(), message in value_strategy()) {
        let cache: Cache<String> = Cache::new(TEST_CAPACITY, TEST_TTL);

        let result = cache.fetch(&key, |_| Err(message.clone()));
        prop_assert_eq!(result, Err(message));
        prop_assert_eq!(cache.get(&key), None);
        prop_assert!(cache.is_empty());
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Once the TTL has elapsed every entry reads as absent, even with no sweep.
    #[test]
    fn prop_ttl_expiration_behavior(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..20)
    ) {
        let cache = Cache::new(TEST_CAPACITY, Duration::from_millis(30));
        for (key, value) in &entries {
            cache.set(key.clone(), value.clone());
        }
        for (key, value) in &entries {
            prop_assert_eq!(cache.get(key), Some(value.clone()));
        }

        sleep(Duration::from_millis(60));

        for key in entries.keys() {
            prop_assert_eq!(cache.get(key), None);
        }
        prop_assert!(cache.is_empty());
        prop_assert_eq!(cache.stats().sweeps, 0);
    }

    // Overflowing the capacity evicts at most one entry per shard per sweep
    // and never the newest key of a shard holding older ones.
    #[test]
    fn prop_overflow_evicts_but_keeps_newest(
        keys in prop::collection::hash_set("[a-z0-9]{1,12}", 40..80)
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len() - 1;
        let cache = Cache::new(capacity, TEST_TTL);

        for key in &keys {
            cache.set(key.clone(), ());
            sleep(Duration::from_micros(50));
        }
        let newest = keys.last().unwrap();
        for _ in 0..500 {
            if !cache.is_sweeping() {
                break;
            }
            sleep(Duration::from_millis(1));
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.sweeps, 1);
        prop_assert!(stats.evictions >= 1 && stats.evictions <= SHARD_COUNT as u64);
        let newest_shard = shard_index(newest, SHARD_COUNT);
        let neighbours = keys
            .iter()
            .filter(|key| shard_index(key, SHARD_COUNT) == newest_shard)
            .count();
        if neighbours > 1 {
            prop_assert_eq!(cache.get(newest), Some(()));
        }
        prop_assert_eq!(cache.len(), keys.len() - stats.evictions as usize);
    }
}
