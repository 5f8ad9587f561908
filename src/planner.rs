//! # Batch Planner
//!
//! Deterministic partitioning of `total_count` records into batches of at most
//! `batch_size` records.
//!
//! Planning is lazy: [`plan`] validates its inputs and returns a [`BatchPlan`]
//! iterator that builds each batch only when it is pulled, so seeding ten
//! million rows never holds more than one batch of records in memory. To
//! replay a plan, call [`plan`] again with the same inputs.
//!
//! ```rust
//! use bulk_seeder::planner::plan;
//!
//! let sizes: Vec<usize> = plan(13, 5).unwrap().map(|batch| batch.len()).collect();
//! assert_eq!(sizes, vec![5, 5, 3]);
//! ```

use std::iter::FusedIterator;

use crate::error::{LoadError, Result};
use crate::models::{Batch, Record};

/// Plan `total_count` records into batches of `batch_size`.
///
/// Fails with [`LoadError::InvalidArgument`] when `batch_size <= 0` or
/// `total_count < 0`. A `total_count` of zero yields an empty plan.
pub fn plan(total_count: i64, batch_size: i64) -> Result<BatchPlan> {
    if batch_size <= 0 {
        return Err(LoadError::invalid_argument(format!(
            "batch_size must be positive, got {batch_size}"
        )));
    }
    if total_count < 0 {
        return Err(LoadError::invalid_argument(format!(
            "total_count must not be negative, got {total_count}"
        )));
    }

    Ok(BatchPlan {
        total_count,
        batch_size,
        next_index: 0,
        next_position: 0,
    })
}

/// Lazy, finite sequence of batches covering `0..total_count` in order.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    total_count: i64,
    batch_size: i64,
    next_index: i64,
    next_position: usize,
}

impl BatchPlan {
    pub fn total_count(&self) -> i64 {
        self.total_count
    }

    pub fn batch_size(&self) -> i64 {
        self.batch_size
    }

    /// Number of batches the full plan contains, regardless of progress.
    pub fn batch_count(&self) -> usize {
        ceil_div(self.total_count, self.batch_size)
    }

    fn remaining_batches(&self) -> usize {
        ceil_div(self.total_count - self.next_index, self.batch_size)
    }
}

impl Iterator for BatchPlan {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.next_index >= self.total_count {
            return None;
        }

        let start = self.next_index;
        let end = start.saturating_add(self.batch_size).min(self.total_count);
        let records: Vec<Record> = (start..end).map(Record::new).collect();

        self.next_index = end;
        let position = self.next_position;
        self.next_position += 1;

        // start < end, so the record list is never empty
        Some(Batch::from_planned(position, records))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_batches();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchPlan {}

impl FusedIterator for BatchPlan {}

fn ceil_div(count: i64, size: i64) -> usize {
    if count <= 0 {
        return 0;
    }
    let batches = count / size + i64::from(count % size != 0);
    usize::try_from(batches).unwrap_or(usize::MAX)
}
