use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use bulk_seeder::persistence::memory::InMemoryTransaction;
use bulk_seeder::persistence::{
    InMemoryRecordStore, PersistenceResult, RecordStore, StoreTransaction,
};
use bulk_seeder::Record;

/// What a [`HookedStore`] does after a given insert.
#[derive(Debug, Clone)]
pub enum InsertHook {
    /// Cancel the token once the nth insert has succeeded
    CancelAfter(usize, CancellationToken),
    /// Never return from the nth insert
    HangAt(usize),
}

/// In-memory store that can cancel a load or stall an insert mid-sequence.
#[derive(Debug, Clone)]
pub struct HookedStore {
    pub inner: InMemoryRecordStore,
    hook: InsertHook,
}

impl HookedStore {
    pub fn new(hook: InsertHook) -> Self {
        Self {
            inner: InMemoryRecordStore::new(),
            hook,
        }
    }
}

#[async_trait]
impl RecordStore for HookedStore {
    type Transaction = HookedTransaction;

    async fn begin(&self) -> PersistenceResult<HookedTransaction> {
        Ok(HookedTransaction {
            inner: self.inner.begin().await?,
            hook: self.hook.clone(),
            inserts: 0,
        })
    }
}

pub struct HookedTransaction {
    inner: InMemoryTransaction,
    hook: InsertHook,
    inserts: usize,
}

#[async_trait]
impl StoreTransaction for HookedTransaction {
    async fn bulk_insert(&mut self, records: &[Record]) -> PersistenceResult<u64> {
        self.inserts += 1;
        if let InsertHook::HangAt(nth) = &self.hook {
            if *nth == self.inserts {
                std::future::pending::<()>().await;
            }
        }

        let rows = self.inner.bulk_insert(records).await?;

        if let InsertHook::CancelAfter(nth, token) = &self.hook {
            if *nth == self.inserts {
                token.cancel();
            }
        }
        Ok(rows)
    }

    async fn commit(self) -> PersistenceResult<()> {
        self.inner.commit().await
    }

    async fn rollback(self) -> PersistenceResult<()> {
        self.inner.rollback().await
    }
}
