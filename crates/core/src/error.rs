//! Store client errors
//!
//! Every failure of a store operation surfaces as a [`StoreError`], whether it
//! originated while building the request, while constructing the client, or
//! inside the backend. Callers have exactly one error path to handle.

use thiserror::Error;

/// Failure of a single store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A conditional write was rejected because its predicate did not hold
    #[error("conditional check failed on {table}: {condition}")]
    ConditionalCheckFailed {
        /// Physical table name
        table: String,
        /// Rendered condition expression
        condition: String,
    },

    /// A single-item lookup found nothing
    #[error("no item in {table} for {key}")]
    NotFound {
        /// Physical table name
        table: String,
        /// Rendered key
        key: String,
    },

    /// A lookup expected one item but the partition held several
    #[error("expected exactly one item in {table} for {key}, found {count}")]
    AmbiguousResult {
        /// Physical table name
        table: String,
        /// Rendered key
        key: String,
        /// Number of items returned (capped by the query limit)
        count: usize,
    },

    /// The request was malformed and never reached the backend
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The table is not defined on the backend
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The store client could not be constructed
    #[error("connection error: {0}")]
    Connection(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport or service failure reported by the backend
    #[error("service error: {0}")]
    Service(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Check if a conditional write was rejected.
    pub fn is_condition_failure(&self) -> bool {
        matches!(self, StoreError::ConditionalCheckFailed { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if the request was rejected before dispatch.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, StoreError::InvalidRequest(_))
    }
}
