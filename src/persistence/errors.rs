/// Errors raised by a [`RecordStore`](super::RecordStore) or its transactions.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Rejected by store: {0}")]
    Rejected(String),

    #[error("Batch of {rows} rows exceeds the per-statement limit of {max}")]
    BatchTooLarge { rows: usize, max: usize },
}

impl PersistenceError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
