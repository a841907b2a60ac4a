//! Error types for whimbrel.
//!
//! Record operations fail with [`Error`], the record-level taxonomy.
//! Store failures with no record meaning arrive wrapped in
//! [`Error::Storage`]; match on the inner [`StoreError`] for detail.

pub use whimbrel_core::StoreError;
pub use whimbrel_primitives::RecordError as Error;

/// Result type for whimbrel operations.
pub type Result<T> = std::result::Result<T, Error>;
