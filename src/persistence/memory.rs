//! In-process record store.
//!
//! Committed rows live behind a `parking_lot::Mutex`; each transaction stages
//! its rows privately and publishes them only on a successful commit. Faults
//! can be armed to make the next transaction fail at a chosen insert, at
//! commit, or at rollback. Each armed fault fires once.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use super::{PersistenceError, PersistenceResult, RecordStore, StoreTransaction};
use crate::models::{Record, SeedRecord};

/// Call counts observed by an [`InMemoryRecordStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounters {
    pub begins: usize,
    pub insert_attempts: usize,
    pub inserts_succeeded: usize,
    pub commits: usize,
    pub rollbacks: usize,
    /// Transactions dropped without commit or rollback.
    pub abandoned: usize,
}

#[derive(Debug, Default)]
struct Faults {
    /// 1-based insert within a transaction that should fail.
    fail_insert_at: Option<usize>,
    fail_commit: bool,
    fail_rollback: bool,
    fail_begin: bool,
}

#[derive(Debug, Default)]
struct Shared {
    rows: Mutex<Vec<SeedRecord>>,
    next_id: Mutex<i64>,
    faults: Mutex<Faults>,
    counters: Mutex<StoreCounters>,
}

/// Cloneable handle to one shared in-memory table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    shared: Arc<Shared>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `nth` (1-based) bulk insert of the next transaction to reach it.
    pub fn fail_insert_at(&self, nth: usize) -> &Self {
        self.shared.faults.lock().fail_insert_at = Some(nth);
        self
    }

    pub fn fail_next_commit(&self) -> &Self {
        self.shared.faults.lock().fail_commit = true;
        self
    }

    pub fn fail_next_rollback(&self) -> &Self {
        self.shared.faults.lock().fail_rollback = true;
        self
    }

    pub fn fail_next_begin(&self) -> &Self {
        self.shared.faults.lock().fail_begin = true;
        self
    }

    pub fn counters(&self) -> StoreCounters {
        *self.shared.counters.lock()
    }

    /// Committed rows in commit order.
    pub fn rows(&self) -> Vec<SeedRecord> {
        self.shared.rows.lock().clone()
    }

    pub fn row_count(&self) -> usize {
        self.shared.rows.lock().len()
    }

    pub fn find_by_sequence_index(&self, sequence_index: i64) -> Option<SeedRecord> {
        self.shared
            .rows
            .lock()
            .iter()
            .find(|row| row.sequence_index == sequence_index)
            .cloned()
    }

    fn publish(&self, staged: Vec<Record>) -> usize {
        let now = Utc::now().naive_utc();
        let mut next_id = self.shared.next_id.lock();
        let mut rows = self.shared.rows.lock();
        let count = staged.len();

        rows.extend(staged.into_iter().map(|record| {
            *next_id += 1;
            SeedRecord {
                id: *next_id,
                label: record.label().to_string(),
                sequence_index: record.sequence_index(),
                created_at: now,
            }
        }));
        count
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> PersistenceResult<InMemoryTransaction> {
        {
            let mut faults = self.shared.faults.lock();
            if faults.fail_begin {
                faults.fail_begin = false;
                return Err(PersistenceError::rejected("injected begin failure"));
            }
        }
        self.shared.counters.lock().begins += 1;

        Ok(InMemoryTransaction {
            store: self.clone(),
            staged: Vec::new(),
            inserts: 0,
            finished: false,
        })
    }
}

/// Transaction over an [`InMemoryRecordStore`]. Staged rows vanish on drop.
#[derive(Debug)]
pub struct InMemoryTransaction {
    store: InMemoryRecordStore,
    staged: Vec<Record>,
    inserts: usize,
    finished: bool,
}

impl InMemoryTransaction {
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn bulk_insert(&mut self, records: &[Record]) -> PersistenceResult<u64> {
        self.inserts += 1;
        self.store.shared.counters.lock().insert_attempts += 1;

        {
            let mut faults = self.store.shared.faults.lock();
            if faults.fail_insert_at == Some(self.inserts) {
                faults.fail_insert_at = None;
                return Err(PersistenceError::rejected(format!(
                    "injected failure on insert {}",
                    self.inserts
                )));
            }
        }

        self.staged.extend_from_slice(records);
        self.store.shared.counters.lock().inserts_succeeded += 1;
        Ok(records.len() as u64)
    }

    async fn commit(mut self) -> PersistenceResult<()> {
        self.finished = true;
        self.store.shared.counters.lock().commits += 1;

        let fail = {
            let mut faults = self.store.shared.faults.lock();
            std::mem::take(&mut faults.fail_commit)
        };
        if fail {
            // staged rows are discarded with the transaction
            return Err(PersistenceError::rejected("injected commit failure"));
        }

        let staged = std::mem::take(&mut self.staged);
        let published = self.store.publish(staged);
        debug!(rows = published, "In-memory transaction committed");
        Ok(())
    }

    async fn rollback(mut self) -> PersistenceResult<()> {
        self.finished = true;
        self.store.shared.counters.lock().rollbacks += 1;
        self.staged.clear();

        let fail = {
            let mut faults = self.store.shared.faults.lock();
            std::mem::take(&mut faults.fail_rollback)
        };
        if fail {
            return Err(PersistenceError::rejected("injected rollback failure"));
        }
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.store.shared.counters.lock().abandoned += 1;
        }
    }
}
