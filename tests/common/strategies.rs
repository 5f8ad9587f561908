use proptest::prelude::*;

/// Record totals, biased towards small plans and exact multiples
pub fn total_count_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0i64),
        0i64..50,
        (1i64..20).prop_map(|n| n * 8),
        0i64..5_000,
    ]
}

/// Positive batch sizes
pub fn batch_size_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(1i64), 1i64..16, 1i64..1_000]
}

/// Zero or negative batch sizes
pub fn invalid_batch_size_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), i64::MIN..=0]
}
