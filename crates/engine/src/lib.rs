//! Record access layer for whimbrel
//!
//! This crate wraps a raw [`KeyValueStore`](whimbrel_core::KeyValueStore)
//! with:
//! - DbConnection: lazily connected, shared store client with request
//!   validation and a single error channel
//! - Table naming from the configured prefix
//! - Timestamp generation and its list encoding
//! - Unique id generation behind a swappable trait

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod id;
pub mod time;

pub use connection::{table_name, DbConnection};
pub use id::{is_uuid_format, FixedIds, IdGenerator, RandomIds};
pub use time::{mk_item_time_list, parse_item_time_list, Timestamp};
