//! PostgreSQL record store.
//!
//! Each bulk insert is a single multi-row `INSERT ... VALUES` statement built
//! with `sqlx::QueryBuilder`. PostgreSQL caps one statement at 65535 bind
//! parameters and each row binds two, which bounds the rows per insert.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use super::{PersistenceError, PersistenceResult, RecordStore, StoreTransaction};
use crate::models::Record;

const MAX_BIND_PARAMETERS: usize = 65_535;
const BINDS_PER_ROW: usize = 2;

/// Largest batch a single bulk insert accepts.
pub const MAX_ROWS_PER_INSERT: usize = MAX_BIND_PARAMETERS / BINDS_PER_ROW;

/// Store writing to the `seed_records` table through a connection pool.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    type Transaction = PgStoreTransaction;

    async fn begin(&self) -> PersistenceResult<PgStoreTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PgStoreTransaction { tx })
    }
}

/// Open PostgreSQL transaction. Dropping it without commit rolls back.
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn bulk_insert(&mut self, records: &[Record]) -> PersistenceResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        if records.len() > MAX_ROWS_PER_INSERT {
            return Err(PersistenceError::BatchTooLarge {
                rows: records.len(),
                max: MAX_ROWS_PER_INSERT,
            });
        }

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO seed_records (label, sequence_index) ");
        builder.push_values(records, |mut row, record| {
            row.push_bind(record.label())
                .push_bind(record.sequence_index());
        });

        let result = builder.build().execute(&mut *self.tx).await?;
        debug!(rows = result.rows_affected(), "Bulk insert executed");
        Ok(result.rows_affected())
    }

    async fn commit(self) -> PersistenceResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> PersistenceResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
