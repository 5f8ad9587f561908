//! # Persistence Interface
//!
//! The only surface the loader depends on: begin a transaction, bulk-insert
//! records into it, then commit or roll back.
//!
//! ## Implementations
//!
//! - [`PgRecordStore`] - PostgreSQL through a shared `sqlx::PgPool`
//! - [`InMemoryRecordStore`] - staged in-process rows with fault injection,
//!   used by tests and dry runs
//!
//! ## Release Guarantee
//!
//! A [`StoreTransaction`] that is dropped without `commit` or `rollback` must
//! leave no durable effects. `sqlx::Transaction` rolls back on drop; the
//! in-memory store discards staged rows on drop. This is what keeps a load
//! all-or-nothing when its future is dropped or the caller panics.

use async_trait::async_trait;

use crate::models::Record;

pub mod errors;
pub mod memory;
pub mod postgres;

pub use errors::{PersistenceError, PersistenceResult};
pub use memory::{InMemoryRecordStore, StoreCounters};
pub use postgres::{PgRecordStore, MAX_ROWS_PER_INSERT};

/// A store that can open transactions for record loading.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Transaction: StoreTransaction;

    /// Open a new transaction owned exclusively by the caller.
    async fn begin(&self) -> PersistenceResult<Self::Transaction>;
}

/// One open transaction against a [`RecordStore`].
#[async_trait]
pub trait StoreTransaction: Send {
    /// Write all `records` as a single operation. Returns rows written.
    async fn bulk_insert(&mut self, records: &[Record]) -> PersistenceResult<u64>;

    async fn commit(self) -> PersistenceResult<()>;

    async fn rollback(self) -> PersistenceResult<()>;
}
