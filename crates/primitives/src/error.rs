//! Record errors
//!
//! Entity-level failures. Store failures that carry no record meaning are
//! wrapped unchanged in [`RecordError::Storage`].

use thiserror::Error;
use whimbrel_core::StoreError;

/// Failure of a record operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Store failure, propagated unchanged
    #[error("storage error: {0}")]
    Storage(#[source] StoreError),

    /// A create found a record with the same identifier
    #[error("duplicate identifier {id} in {table}")]
    DuplicateIdentifier {
        /// Physical table name
        table: String,
        /// Rejected identifier
        id: String,
    },

    /// No record for the requested key
    #[error("not found: {key} in {table}")]
    NotFound {
        /// Physical table name
        table: String,
        /// Rendered key
        key: String,
    },

    /// A lookup expected one record but found several
    #[error("ambiguous result: {count} records for {key} in {table}")]
    AmbiguousResult {
        /// Physical table name
        table: String,
        /// Rendered key
        key: String,
        /// Records found (capped by the query limit)
        count: usize,
    },

    /// Stored attributes do not form a valid record
    #[error("corrupt record in {table}: {reason}")]
    CorruptRecord {
        /// Physical table name
        table: String,
        /// What was wrong
        reason: String,
    },

    /// The stored state moved on since this entity last saw it
    #[error("stale state for {workflow_exec_id}: expected {expected}")]
    StaleState {
        /// Execution whose transition was rejected
        workflow_exec_id: String,
        /// State the writer expected to replace
        expected: String,
    },

    /// A state token that cannot be stored
    #[error("invalid state: {0:?}")]
    InvalidState(String),
}

/// Result type for record operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;

impl RecordError {
    /// Check if this error is retryable.
    ///
    /// Only a lost state race is: refresh the entity and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecordError::StaleState { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound { .. })
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RecordError::DuplicateIdentifier { .. } | RecordError::StaleState { .. }
        )
    }

    pub(crate) fn corrupt(table: &str, reason: impl Into<String>) -> Self {
        RecordError::CorruptRecord {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for RecordError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { table, key } => RecordError::NotFound { table, key },
            StoreError::AmbiguousResult { table, key, count } => {
                RecordError::AmbiguousResult { table, key, count }
            }
            other => RecordError::Storage(other),
        }
    }
}
