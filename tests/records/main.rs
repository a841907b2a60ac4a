//! Workflow Record Test Suite
//!
//! End-to-end tests of the record layer through the `Whimbrel` facade,
//! running on the in-memory backend.
//!
//! ## Modules
//!
//! - `requests`: request creation, ids, read-back
//! - `execs`: execution creation, reads, state transitions
//! - `concurrency`: racing creators and racing transitions
//! - `failures`: store failures surfacing as `Storage` errors
//! - `naming`: table prefixes and the wire shape of stored items
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test records
//! cargo test --test records concurrency::
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use whimbrel::prelude::*;
use whimbrel::{KeyValueStore, MemoryStore, StoreConnector};
use whimbrel_core::{
    GetItemRequest, PutItemRequest, QueryOutput, QueryRequest, StoreResult, TableSchema,
    UpdateItemRequest,
};

pub mod execs;
pub mod naming;
pub mod requests;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Install a test subscriber. Repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Fresh handle on a fresh in-memory store
pub fn create_whimbrel() -> Whimbrel {
    init_test_tracing();
    Whimbrel::ephemeral().expect("ephemeral whimbrel")
}

/// Handle plus direct access to its store, with the record tables installed
pub async fn create_whimbrel_with_store() -> (Whimbrel, Arc<MemoryStore>) {
    init_test_tracing();
    let store = Arc::new(MemoryStore::new());
    let wb = Whimbrel::builder()
        .memory(Arc::clone(&store))
        .open()
        .expect("whimbrel on store");
    wb.install_tables().await.expect("install tables");
    (wb, store)
}

/// Store wrapper whose writes fail with a service error while `failing` is set.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Service("throttled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn create_table(&self, schema: TableSchema) -> StoreResult<()> {
        self.inner.create_table(schema).await
    }

    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<whimbrel::Item>> {
        self.inner.get_item(request).await
    }

    async fn put_item(&self, request: PutItemRequest) -> StoreResult<()> {
        self.check()?;
        self.inner.put_item(request).await
    }

    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<whimbrel::Item> {
        self.check()?;
        self.inner.update_item(request).await
    }

    async fn query(&self, request: QueryRequest) -> StoreResult<QueryOutput> {
        KeyValueStore::query(self.inner.as_ref(), request).await
    }
}

/// Store wrapper that serves point reads with one attribute overwritten.
///
/// Queries and writes pass through untouched, so only `get_item` readers
/// see the altered record.
pub struct RewritingStore {
    inner: Arc<MemoryStore>,
    attribute: String,
    value: whimbrel::AttributeValue,
}

impl RewritingStore {
    pub fn new(
        inner: Arc<MemoryStore>,
        attribute: &str,
        value: impl Into<whimbrel::AttributeValue>,
    ) -> Self {
        Self {
            inner,
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl KeyValueStore for RewritingStore {
    async fn create_table(&self, schema: TableSchema) -> StoreResult<()> {
        self.inner.create_table(schema).await
    }

    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<whimbrel::Item>> {
        let item = self.inner.get_item(request).await?;
        Ok(item.map(|mut item| {
            item.insert(self.attribute.clone(), self.value.clone());
            item
        }))
    }

    async fn put_item(&self, request: PutItemRequest) -> StoreResult<()> {
        self.inner.put_item(request).await
    }

    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<whimbrel::Item> {
        self.inner.update_item(request).await
    }

    async fn query(&self, request: QueryRequest) -> StoreResult<QueryOutput> {
        KeyValueStore::query(self.inner.as_ref(), request).await
    }
}

/// Connector handing out one shared store
pub struct SharedConnector(pub Arc<dyn KeyValueStore>);

impl StoreConnector for SharedConnector {
    fn connect(&self, _options: &ConnectionOptions) -> StoreResult<Arc<dyn KeyValueStore>> {
        Ok(Arc::clone(&self.0))
    }
}

/// Handle over any store, with the record tables installed
pub async fn create_whimbrel_over(store: Arc<dyn KeyValueStore>) -> Whimbrel {
    init_test_tracing();
    let wb = Whimbrel::builder()
        .connector(Arc::new(SharedConnector(store)))
        .open()
        .expect("whimbrel over store");
    wb.install_tables().await.expect("install tables");
    wb
}

/// Handle whose store can be switched into failing writes
pub async fn create_flaky_whimbrel() -> (Whimbrel, Arc<FlakyStore>) {
    let flaky = Arc::new(FlakyStore::new(Arc::new(MemoryStore::new())));
    let wb = create_whimbrel_over(Arc::clone(&flaky) as Arc<dyn KeyValueStore>).await;
    (wb, flaky)
}
