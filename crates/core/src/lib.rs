//! Core types for Whimbrel execution records
//!
//! This crate defines the vocabulary shared by every other crate:
//! - [`AttributeValue`] / [`Item`]: typed attribute maps as the store persists them
//! - [`Condition`]: server-evaluated predicates for conditional writes
//! - Request types for the four store operations (get, put, update, query)
//! - [`KeyValueStore`] / [`StoreConnector`]: the seams a backend implements
//! - [`StoreError`]: the single failure channel of the store client
//! - [`StoreConfig`]: table prefix plus pass-through connection options

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod request;
pub mod schema;
pub mod traits;
pub mod value;

pub use config::{
    ConnectionOptions, HttpOptions, StaticCredentials, StoreConfig, DEFAULT_DB_PREFIX,
};
pub use error::{StoreError, StoreResult};
pub use request::{
    Condition, GetItemRequest, PutItemRequest, QueryOutput, QueryRequest, UpdateItemRequest,
};
pub use schema::{KeyAttribute, ScalarType, TableSchema};
pub use traits::{KeyValueStore, StoreConnector};
pub use value::{AttributeValue, Item};
