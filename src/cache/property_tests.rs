//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check TTL, round-trip, invalidation and key properties.
//! Async code is driven with `tokio_test::block_on`.

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_test::block_on;

use crate::cache::{CacheBackend, CacheKey, CacheService, LocalCache, ManualClock};

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

/// Category and id segments, deliberately heavy on separators
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z_%]{1,8}".prop_map(|s| s)
}

fn key_variant_strategy() -> impl Strategy<Value = CacheKey> {
    prop_oneof![
        Just(CacheKey::AllProducts),
        Just(CacheKey::AllCategories),
        segment_strategy().prop_map(CacheKey::category_products),
        (segment_strategy(), segment_strategy()).prop_map(|(c, i)| CacheKey::product(c, i)),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    id: String,
    price: i64,
    tags: Vec<String>,
    attributes: BTreeMap<String, String>,
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        value_strategy(),
        any::<i64>(),
        prop::collection::vec(value_strategy(), 0..5),
        prop::collection::btree_map(key_strategy(), value_strategy(), 0..5),
    )
        .prop_map(|(id, price, tags, attributes)| Record {
            id,
            price,
            tags,
            attributes,
        })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn local_cache(now: u64) -> (Arc<ManualClock>, Arc<LocalCache>) {
    let clock = Arc::new(ManualClock::new(now));
    let cache = Arc::new(LocalCache::new(clock.clone()));
    (clock, cache)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A value set with TTL t is visible strictly before set_time + t*1000 and
    // gone (and purged) from that instant on.
    #[test]
    fn prop_ttl_boundary(
        key in key_strategy(),
        value in value_strategy(),
        set_time in 0u64..1_000_000_000,
        ttl in 1u64..100_000,
    ) {
        let (clock, cache) = local_cache(set_time);
        block_on(cache.set(&key, value.clone(), Some(ttl)));

        let expiry = set_time + ttl * 1000;
        clock.set(expiry - 1);
        prop_assert_eq!(block_on(cache.get(&key)), Some(value));

        clock.set(expiry);
        prop_assert_eq!(block_on(cache.get(&key)), None);
        prop_assert!(block_on(cache.is_empty()), "Expired entry should be purged");
    }

    // Any serializable value reads back deep-equal before its TTL lapses.
    #[test]
    fn prop_cache_data_round_trip(key in key_strategy(), record in record_strategy()) {
        let (_clock, cache) = local_cache(0);
        let service = CacheService::new(cache);

        block_on(service.cache_data(&key, &record, None));
        prop_assert_eq!(block_on(service.get_cached_data::<Record>(&key)), Some(record));
    }

    // Invalidating twice is observably the same as invalidating once.
    #[test]
    fn prop_invalidate_idempotent(key in key_strategy(), value in value_strategy()) {
        let (_clock, cache) = local_cache(0);
        let service = CacheService::new(cache.clone());

        block_on(service.cache_data(&key, &value, None));
        block_on(service.invalidate_cache(&key));
        let once = block_on(cache.get(&key));
        block_on(service.invalidate_cache(&key));
        let twice = block_on(cache.get(&key));

        prop_assert_eq!(once, None);
        prop_assert_eq!(twice, None);
    }

    // Two different keys never render to the same string.
    #[test]
    fn prop_keys_never_collide(a in key_variant_strategy(), b in key_variant_strategy()) {
        if a != b {
            prop_assert_ne!(a.to_string(), b.to_string());
        } else {
            prop_assert_eq!(a.to_string(), b.to_string());
        }
    }

    // Facade hit/miss counters match what callers observed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let (_clock, cache) = local_cache(0);
        let service = CacheService::new(cache);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    block_on(service.cache_data(&key, &value, None));
                }
                CacheOp::Get { key } => {
                    match block_on(service.get_cached_data::<String>(&key)) {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
                CacheOp::Delete { key } => {
                    block_on(service.invalidate_cache(&key));
                }
            }
        }

        let stats = service.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }

    // Concurrent readers only ever see complete values that some writer stored.
    #[test]
    fn prop_concurrent_operation_correctness(
        initial_entries in prop::collection::vec((key_strategy(), value_strategy()), 1..20),
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let (_clock, cache) = local_cache(0);

            let mut written: HashSet<String> = HashSet::new();
            for (key, value) in &initial_entries {
                cache.set(key, value.clone(), None).await;
                written.insert(value.clone());
            }
            for op in &operations {
                if let CacheOp::Set { value, .. } = op {
                    written.insert(value.clone());
                }
            }
            let written = Arc::new(written);

            let mut handles = vec![];
            for op in operations {
                let cache = Arc::clone(&cache);
                let written = Arc::clone(&written);

                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Set { key, value } => {
                            cache.set(&key, value, None).await;
                            Ok::<_, String>(())
                        }
                        CacheOp::Get { key } => match cache.get(&key).await {
                            Some(value) if !written.contains(&value) => {
                                Err(format!("Key '{}' returned unknown value '{}'", key, value))
                            }
                            _ => Ok(()),
                        },
                        CacheOp::Delete { key } => {
                            cache.del(&key).await;
                            Ok(())
                        }
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            Ok(())
        })?;
    }
}

// == Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every API error renders as JSON with a string "error" field.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::ApiError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            ApiError::NotFound(error_msg.clone()),
            ApiError::InvalidRequest(error_msg.clone()),
            ApiError::Unauthorized,
            ApiError::Internal(error_msg.clone()),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = block_on(to_bytes(response.into_body(), usize::MAX)).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}
