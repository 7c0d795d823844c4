//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check capacity, recency and statistics invariants against
//! arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{hit_rate, CacheStore};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        6 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => Just(CacheOp::Clear),
    ]
}

/// Reference model: a plain recency queue (front = most recent)
#[derive(Default)]
struct Model {
    order: VecDeque<(String, Vec<u8>)>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Model {
    fn touch(&mut self, key: &str) -> Option<Vec<u8>> {
        let pos = self.order.iter().position(|(k, _)| k == key)?;
        let item = self.order.remove(pos)?;
        let value = item.1.clone();
        self.order.push_front(item);
        Some(value)
    }

    fn set(&mut self, key: String, value: Vec<u8>, capacity: usize) {
        if self.touch(&key).is_some() {
            self.order[0].1 = value;
            return;
        }
        self.order.push_front((key, value));
        if self.order.len() > capacity {
            self.order.pop_back();
            self.evictions += 1;
        }
    }

    fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let found = self.touch(key);
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every Set leaves the store at or below capacity.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 1usize..8,
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..100)
    ) {
        let mut store = CacheStore::new(capacity);

        for (key, value) in entries {
            store.set(key, value, TEST_TTL);
            prop_assert!(
                store.len() <= store.capacity(),
                "Cache size {} exceeds capacity {}",
                store.len(),
                store.capacity()
            );
        }
    }

    // The store behaves exactly like the reference recency model, including
    // which key gets evicted and the hit/miss/eviction counters.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = CacheStore::new(capacity);
        let mut model = Model::default();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone(), TEST_TTL);
                    model.set(key, value, capacity);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key));
                }
                CacheOp::Clear => {
                    store.clear();
                    model.order.clear();
                }
            }

            let expected: Vec<String> = model.order.iter().map(|(k, _)| k.clone()).collect();
            prop_assert_eq!(store.keys_by_recency(), expected);
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hit_count, model.hits);
        prop_assert_eq!(stats.miss_count, model.misses);
        prop_assert_eq!(stats.eviction_count, model.evictions);
    }

    // Overflowing a full cache evicts the least recently used key only.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::vec("[a-z]{3,8}", 2..10),
        new_key in "[A-Z]{3,8}"
    ) {
        let unique_keys: Vec<String> = initial_keys
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        prop_assume!(unique_keys.len() >= 2);

        let capacity = unique_keys.len();
        let mut store = CacheStore::new(capacity);
        for key in &unique_keys {
            store.set(key.clone(), key.as_bytes().to_vec(), TEST_TTL);
        }

        let evicted = store.set(new_key.clone(), vec![0], TEST_TTL);

        prop_assert_eq!(evicted.as_ref(), Some(&unique_keys[0]));
        prop_assert_eq!(store.len(), capacity);
        prop_assert!(store.contains(&new_key));
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.contains(key), "Key '{}' should survive", key);
        }
    }

    // A Get moves the key out of the eviction slot.
    #[test]
    fn prop_get_refreshes_recency(
        keys in prop::collection::vec("[a-z]{3,8}", 3..8),
        new_key in "[A-Z]{3,8}"
    ) {
        let unique_keys: Vec<String> = keys
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        prop_assume!(unique_keys.len() >= 3);

        let mut store = CacheStore::new(unique_keys.len());
        for key in &unique_keys {
            store.set(key.clone(), vec![1], TEST_TTL);
        }

        prop_assert!(store.get(&unique_keys[0]).is_some());
        let evicted = store.set(new_key, vec![2], TEST_TTL);

        prop_assert_eq!(evicted.as_ref(), Some(&unique_keys[1]));
        prop_assert!(store.contains(&unique_keys[0]));
    }

    // hit_rate is hits / (hits + misses) * 100, or 0 with no accesses.
    #[test]
    fn prop_hit_rate_arithmetic(
        ops in prop::collection::vec(cache_op_strategy(), 0..60)
    ) {
        let mut store = CacheStore::new(4);
        for op in ops {
            match op {
                CacheOp::Set { key, value } => { store.set(key, value, TEST_TTL); }
                CacheOp::Get { key } => { store.get(&key); }
                CacheOp::Clear => store.clear(),
            }
        }

        let stats = store.stats();
        let total = stats.hit_count + stats.miss_count;
        if total == 0 {
            prop_assert_eq!(stats.hit_rate, 0.0);
        } else {
            let expected = stats.hit_count as f64 / total as f64 * 100.0;
            prop_assert!((stats.hit_rate - expected).abs() < 1e-9);
        }
        prop_assert_eq!(stats.hit_rate, hit_rate(stats.hit_count, stats.miss_count));
    }
}

// Separate block with few cases for the sleep-based TTL check
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Expired entries read as misses and never count as evictions.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(8);

        store.set(key.clone(), value.clone(), Duration::from_millis(1));
        sleep(Duration::from_millis(3));

        prop_assert_eq!(store.get(&key), None);
        let stats = store.stats();
        prop_assert_eq!(stats.eviction_count, 0);
        prop_assert_eq!(stats.miss_count, 1);
        prop_assert!(store.is_empty());
    }
}
