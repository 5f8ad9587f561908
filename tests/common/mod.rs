#![allow(dead_code)]

pub mod hooked_store;
pub mod strategies;

#[allow(unused_imports)]
pub use hooked_store::*;
#[allow(unused_imports)]
pub use strategies::*;

use bulk_seeder::Batch;

/// Sequence indices of every record in `batches`, in order.
pub fn flattened_indices<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Vec<i64> {
    batches
        .into_iter()
        .flat_map(|batch| batch.records().iter().map(|record| record.sequence_index()))
        .collect()
}
