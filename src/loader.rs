//! # Transactional Loader
//!
//! Writes an ordered sequence of batches under one transaction, all or
//! nothing.
//!
//! ## Session Lifecycle
//!
//! Every call to [`TransactionalLoader::load`] opens one [`LoadSession`], which
//! owns the store transaction by value. The session ends in exactly one
//! terminal action:
//!
//! - **commit** once every batch has been inserted
//! - **rollback** on the first insert failure or on cancellation
//!
//! If the `load` future is dropped or the caller panics mid-sequence, the
//! session drops its transaction unfinished and the store's drop behaviour
//! rolls it back.
//!
//! A failed commit is not followed by an explicit rollback: the commit call
//! consumes the transaction and the backend has already aborted it.
//!
//! ## Cancellation
//!
//! Each insert is raced against the [`CancellationToken`], and the token is
//! checked once more before commit. Cancelling interrupts an insert that is
//! still waiting on the store, rolls the session back, and reports
//! [`LoadError::Cancelled`]. sqlx drains the interrupted statement before the
//! rollback runs.

use std::fmt;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{LoadError, Result};
use crate::models::Batch;
use crate::persistence::{PersistenceResult, RecordStore, StoreTransaction};

/// Default number of batches between progress log lines.
pub const DEFAULT_PROGRESS_LOG_INTERVAL: usize = 100;

/// Outcome of a committed load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub batches_committed: usize,
    pub records_committed: u64,
    pub elapsed: Duration,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} records committed", self.records_committed)
    }
}

/// Loads batches into a [`RecordStore`] inside a single transaction.
#[derive(Debug, Clone)]
pub struct TransactionalLoader {
    cancel: CancellationToken,
    progress_log_interval: usize,
}

impl Default for TransactionalLoader {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            progress_log_interval: DEFAULT_PROGRESS_LOG_INTERVAL,
        }
    }
}

impl TransactionalLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort loads when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Log progress every `interval` batches; zero disables progress lines.
    pub fn with_progress_log_interval(mut self, interval: usize) -> Self {
        self.progress_log_interval = interval;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Insert every batch in order under one transaction.
    ///
    /// Returns a [`LoadReport`] after a successful commit. On failure the
    /// transaction has been rolled back (or aborted by a failed commit) and
    /// nothing from this call remains in the store.
    pub async fn load<S, I>(&self, store: &S, batches: I) -> Result<LoadReport>
    where
        S: RecordStore,
        I: IntoIterator<Item = Batch>,
        I::IntoIter: Send,
    {
        let started = Instant::now();
        let mut session = LoadSession::open(store).await?;

        info!("Load session opened");

        for (offset, batch) in batches.into_iter().enumerate() {
            let batch_index = offset + 1;
            let inserted = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = session.insert(&batch) => Some(result),
            };

            match inserted {
                None => {
                    let batches_inserted = session.batches_inserted();
                    return Err(session.abort(LoadError::Cancelled { batches_inserted }).await);
                }
                Some(Ok(rows)) => {
                    debug!(
                        batch_index = batch_index,
                        first_index = batch.first_index(),
                        last_index = batch.last_index(),
                        rows = rows,
                        "Batch inserted"
                    );
                }
                Some(Err(cause)) => {
                    return Err(session
                        .abort(LoadError::InsertFailure { batch_index, cause })
                        .await);
                }
            }

            if self.progress_log_interval > 0 && batch_index % self.progress_log_interval == 0 {
                info!(
                    batches_inserted = session.batches_inserted(),
                    records_inserted = session.records_inserted(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Load progress"
                );
            }
        }

        if self.cancel.is_cancelled() {
            let batches_inserted = session.batches_inserted();
            return Err(session.abort(LoadError::Cancelled { batches_inserted }).await);
        }

        let (batches_committed, records_committed) = session.commit().await?;
        let report = LoadReport {
            batches_committed,
            records_committed,
            elapsed: started.elapsed(),
        };

        info!(
            batches = report.batches_committed,
            records = report.records_committed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Inserted {} records successfully",
            report.records_committed
        );

        Ok(report)
    }
}

/// Load with default options: no cancellation, default progress interval.
pub async fn load<S, I>(store: &S, batches: I) -> Result<LoadReport>
where
    S: RecordStore,
    I: IntoIterator<Item = Batch>,
    I::IntoIter: Send,
{
    TransactionalLoader::default().load(store, batches).await
}

/// Exclusive owner of one transaction for the duration of a load.
pub struct LoadSession<T: StoreTransaction> {
    tx: T,
    batches_inserted: usize,
    records_inserted: u64,
}

impl<T: StoreTransaction> LoadSession<T> {
    pub async fn open<S>(store: &S) -> Result<Self>
    where
        S: RecordStore<Transaction = T>,
    {
        let tx = store.begin().await.map_err(|cause| {
            error!(error = %cause, "Failed to begin load transaction");
            LoadError::BeginFailure { cause }
        })?;

        Ok(Self {
            tx,
            batches_inserted: 0,
            records_inserted: 0,
        })
    }

    pub fn batches_inserted(&self) -> usize {
        self.batches_inserted
    }

    pub fn records_inserted(&self) -> u64 {
        self.records_inserted
    }

    pub async fn insert(&mut self, batch: &Batch) -> PersistenceResult<u64> {
        let rows = self.tx.bulk_insert(batch.records()).await?;
        self.batches_inserted += 1;
        self.records_inserted += rows;
        Ok(rows)
    }

    /// Commit and return `(batches, records)` written.
    pub async fn commit(self) -> Result<(usize, u64)> {
        let Self {
            tx,
            batches_inserted,
            records_inserted,
        } = self;

        tx.commit().await.map_err(|cause| {
            error!(
                error = %cause,
                batches_inserted = batches_inserted,
                "Commit failed; transaction aborted by the store"
            );
            LoadError::CommitFailure { cause }
        })?;

        Ok((batches_inserted, records_inserted))
    }

    /// Roll back and hand `reason` back to the caller.
    ///
    /// A rollback failure is logged; `reason` is still what gets returned.
    pub async fn abort(self, reason: LoadError) -> LoadError {
        warn!(
            stage = reason.stage(),
            error = %reason,
            batches_inserted = self.batches_inserted,
            "Load failed. Rolling back."
        );

        match self.tx.rollback().await {
            Ok(()) => info!(stage = reason.stage(), "Transaction rolled back"),
            Err(rollback_error) => error!(
                error = %rollback_error,
                original_error = %reason,
                "Rollback failed after load failure"
            ),
        }

        reason
    }
}
