//! # Record and Batch
//!
//! The in-memory shapes the planner produces and the loader consumes.
//!
//! A [`Record`] is identified only by its sequence index until a store assigns
//! it a row id. A [`Batch`] is a non-empty, ordered run of records that is
//! written with a single bulk insert.

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// One logical row: a label derived from the index, and the index itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    label: String,
    sequence_index: i64,
}

impl Record {
    /// Build the record for `sequence_index` with its derived label.
    pub fn new(sequence_index: i64) -> Self {
        Self {
            label: format!("Value {sequence_index}"),
            sequence_index,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sequence_index(&self) -> i64 {
        self.sequence_index
    }
}

/// A contiguous group of records inserted as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    position: usize,
    records: Vec<Record>,
}

impl Batch {
    /// Create a batch at 0-based `position` in its plan.
    ///
    /// Fails with [`LoadError::InvalidArgument`] when `records` is empty.
    pub fn new(position: usize, records: Vec<Record>) -> Result<Self> {
        if records.is_empty() {
            return Err(LoadError::invalid_argument(format!(
                "batch at position {position} has no records"
            )));
        }
        Ok(Self { position, records })
    }

    /// Build a batch the planner has already proven non-empty.
    pub(crate) fn from_planned(position: usize, records: Vec<Record>) -> Self {
        debug_assert!(!records.is_empty(), "planned batch {position} is empty");
        Self { position, records }
    }

    /// 0-based position in the plan.
    pub fn position(&self) -> usize {
        self.position
    }

    /// 1-based ordinal, as reported in insert failures.
    pub fn ordinal(&self) -> usize {
        self.position + 1
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; batches are constructed non-empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_index(&self) -> i64 {
        self.records[0].sequence_index()
    }

    pub fn last_index(&self) -> i64 {
        self.records[self.records.len() - 1].sequence_index()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
