use crate::persistence::PersistenceError;

/// Terminal outcome of planning or loading.
///
/// Every failed `load` ends in exactly one of these; there is no partial
/// success. Rollback failures are logged by the loader and never replace
/// the variant reported here.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to begin transaction: {cause}")]
    BeginFailure {
        #[source]
        cause: PersistenceError,
    },

    /// `batch_index` is the 1-based position of the rejected batch.
    #[error("Insert of batch {batch_index} failed: {cause}")]
    InsertFailure {
        batch_index: usize,
        #[source]
        cause: PersistenceError,
    },

    #[error("Commit failed: {cause}")]
    CommitFailure {
        #[source]
        cause: PersistenceError,
    },

    #[error("Load cancelled after {batches_inserted} batches; transaction rolled back")]
    Cancelled { batches_inserted: usize },
}

impl LoadError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Short stage name used in structured log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            LoadError::InvalidArgument(_) => "validation",
            LoadError::BeginFailure { .. } => "begin",
            LoadError::InsertFailure { .. } => "insert",
            LoadError::CommitFailure { .. } => "commit",
            LoadError::Cancelled { .. } => "cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
