//! # Whimbrel
//!
//! Lifecycle records for asynchronous workflow executions, kept in a
//! key-value store.
//!
//! ## Quick Start
//!
//! ```ignore
//! use whimbrel::prelude::*;
//!
//! let wb = Whimbrel::ephemeral()?;
//!
//! // Create-once request record
//! let request_id = wb.requests.create("nightly_import").await?;
//!
//! // Execution record, starts in REQUESTED
//! let mut exec = wb.execs.create("nightly_import", Some(request_id.as_str())).await?;
//!
//! // Compare-and-swap transition
//! match exec.set_state("running").await {
//!     Ok(()) => {}
//!     Err(e) if e.is_retryable() => exec.refresh().await?,
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Record creation is conditional: an identifier is written at most once
//! - State transitions only apply if the stored state is the one the writer
//!   last saw, and the in-memory state follows only confirmed writes
//! - Nothing is retried automatically
//!
//! ## Crates
//!
//! - `whimbrel-core` - attribute values, requests, store traits, errors, config
//! - `whimbrel-storage` - in-memory backend
//! - `whimbrel-engine` - connection, table naming, timestamps, ids
//! - `whimbrel-primitives` - request and execution records

#![warn(missing_docs)]

mod database;
mod error;

pub mod prelude;

// Re-export main entry points
pub use database::{Whimbrel, WhimbrelBuilder};
pub use error::{Error, Result, StoreError};

// Re-export records
pub use whimbrel_primitives::{
    ExecState, RequestOptions, WorkflowExec, WorkflowExecs, WorkflowRequest, WorkflowRequests,
    DEFAULT_SOURCE,
};

// Re-export the layers below
pub use whimbrel_core::{
    AttributeValue, Condition, ConnectionOptions, Item, KeyValueStore, StoreConfig,
    StoreConnector, TableSchema, DEFAULT_DB_PREFIX,
};
pub use whimbrel_engine::{DbConnection, FixedIds, IdGenerator, RandomIds, Timestamp};
pub use whimbrel_storage::{MemoryConnector, MemoryStore};
