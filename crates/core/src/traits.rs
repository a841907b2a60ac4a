//! Backend seams
//!
//! [`KeyValueStore`] is the raw store API the client layer wraps. A
//! [`StoreConnector`] builds a store client from connection options; the
//! client layer calls it lazily, at most once per connection.

use crate::config::ConnectionOptions;
use crate::error::StoreResult;
use crate::request::{GetItemRequest, PutItemRequest, QueryOutput, QueryRequest, UpdateItemRequest};
use crate::schema::TableSchema;
use crate::value::Item;
use async_trait::async_trait;
use std::sync::Arc;

/// Raw key-value store API.
///
/// Implementations must evaluate request conditions atomically with the
/// write they guard: two writers whose conditions both hold against the
/// same stored item can never both succeed.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Define a table. Defining an identical schema twice is a no-op.
    async fn create_table(&self, schema: TableSchema) -> StoreResult<()>;

    /// Fetch one item by exact key. `None` if absent.
    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>>;

    /// Insert or replace an item if its condition holds.
    async fn put_item(&self, request: PutItemRequest) -> StoreResult<()>;

    /// Apply `SET` clauses if the condition holds; returns the updated item.
    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<Item>;

    /// Return items of one partition, ordered by range key.
    async fn query(&self, request: QueryRequest) -> StoreResult<QueryOutput>;
}

/// Builds store clients from connection options.
pub trait StoreConnector: Send + Sync {
    /// Construct a client. Options are passed through unchanged.
    fn connect(&self, options: &ConnectionOptions) -> StoreResult<Arc<dyn KeyValueStore>>;
}
