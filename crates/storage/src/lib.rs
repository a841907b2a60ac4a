//! Storage backends for whimbrel
//!
//! This crate implements the in-memory key-value backend with:
//! - MemoryStore: DashMap of tables, FxHash DashMap of items per table
//! - Conditional put/update evaluated under the item's entry guard
//! - Partition queries ordered by range key
//! - MemoryConnector: hands out a shared store to the client layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connector;
pub mod memory;

pub use connector::MemoryConnector;
pub use memory::{ItemKey, MemoryStore, Table};
