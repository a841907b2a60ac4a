//! Store connection
//!
//! [`DbConnection`] is the one path from records to the store. It owns the
//! configuration, builds the store client on first use, validates every
//! request before dispatch and reports all failures through
//! [`StoreResult`].
//!
//! ## Lazy client
//!
//! The client is built at most once per connection and shared afterwards.
//! A failed build is not cached: the next call tries the connector again.

use crate::id::{IdGenerator, RandomIds};
use crate::time::Timestamp;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info, warn};
use whimbrel_core::{
    AttributeValue, GetItemRequest, Item, KeyValueStore, PutItemRequest, QueryRequest,
    StoreConfig, StoreConnector, StoreError, StoreResult, TableSchema, UpdateItemRequest,
};

/// Physical name of a logical table: `prefix + logical`.
pub fn table_name(prefix: &str, logical: &str) -> String {
    format!("{}{}", prefix, logical)
}

/// Shared connection to the record store
///
/// # Example
///
/// ```ignore
/// let conn = DbConnection::new(StoreConfig::default(), connector);
/// let request = GetItemRequest::new(conn.table_name("workflow_request"))
///     .key("workflow_request_id", id);
/// let item = conn.read(request).await?;
/// ```
pub struct DbConnection {
    config: StoreConfig,
    connector: Arc<dyn StoreConnector>,
    client: OnceCell<Arc<dyn KeyValueStore>>,
    ids: Arc<dyn IdGenerator>,
}

impl DbConnection {
    /// Create an unconnected connection. Nothing is contacted until the
    /// first store operation.
    pub fn new(config: StoreConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config,
            connector,
            client: OnceCell::new(),
            ids: Arc::new(RandomIds),
        }
    }

    /// Replace the id generator
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Configuration this connection was built with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Configured table prefix
    pub fn prefix(&self) -> &str {
        &self.config.db_prefix
    }

    /// Check whether the store client has been built
    pub fn is_connected(&self) -> bool {
        self.client.get().is_some()
    }

    // ========================================================================
    // Record helpers
    // ========================================================================

    /// Physical name of a logical table
    pub fn table_name(&self, logical: &str) -> String {
        table_name(&self.config.db_prefix, logical)
    }

    /// Current time in both record encodings
    pub fn mk_time(&self) -> Timestamp {
        Timestamp::now()
    }

    /// Fresh unique id
    pub fn mk_uuid(&self) -> String {
        self.ids.next_id()
    }

    fn client(&self) -> StoreResult<&Arc<dyn KeyValueStore>> {
        self.client.get_or_try_init(|| {
            let client = self.connector.connect(&self.config.connection)?;
            info!(
                prefix = %self.config.db_prefix,
                options = ?self.config.connection.present_keys(),
                "store client initialised"
            );
            Ok(client)
        })
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Fetch one record by exact key. `None` if absent.
    pub async fn read(&self, request: GetItemRequest) -> StoreResult<Option<Item>> {
        request.validate()?;
        self.client()?.get_item(request).await
    }

    /// Fetch the single record whose hash key is `key_value`.
    ///
    /// Zero matches fail with [`StoreError::NotFound`], two or more with
    /// [`StoreError::AmbiguousResult`].
    pub async fn read_by_key(
        &self,
        table: &str,
        key_name: &str,
        key_value: impl Into<AttributeValue>,
    ) -> StoreResult<Item> {
        let request = QueryRequest::new(table, key_name, key_value).limit(2);
        request.validate()?;
        let key = format!("{} = {}", request.key_name, request.key_value);

        let mut items = self.client()?.query(request).await?.items;
        match items.len() {
            0 => Err(StoreError::NotFound {
                table: table.to_string(),
                key,
            }),
            1 => Ok(items.remove(0)),
            count => Err(StoreError::AmbiguousResult {
                table: table.to_string(),
                key,
                count,
            }),
        }
    }

    /// Like [`read_by_key`](Self::read_by_key), but zero and ambiguous
    /// matches both yield `None`.
    pub async fn read_by_key_opt(
        &self,
        table: &str,
        key_name: &str,
        key_value: impl Into<AttributeValue>,
    ) -> StoreResult<Option<Item>> {
        match self.read_by_key(table, key_name, key_value).await {
            Ok(item) => Ok(Some(item)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(StoreError::AmbiguousResult { table, key, count }) => {
                warn!(%table, %key, count, "ambiguous key lookup treated as missing");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Insert a record if its condition holds.
    pub async fn create(&self, request: PutItemRequest) -> StoreResult<()> {
        request.validate()?;
        let table = request.table_name.clone();
        let result = self.client()?.put_item(request).await;
        if let Err(StoreError::ConditionalCheckFailed { condition, .. }) = &result {
            debug!(%table, %condition, "conditional create rejected");
        }
        result
    }

    /// Apply an update if its condition holds. Never retried.
    pub async fn update(&self, request: UpdateItemRequest) -> StoreResult<Item> {
        request.validate()?;
        let table = request.table_name.clone();
        let expression = request.update_expression();
        let result = self.client()?.update_item(request).await;
        if let Err(StoreError::ConditionalCheckFailed { condition, .. }) = &result {
            debug!(%table, %expression, %condition, "conditional update rejected");
        }
        result
    }

    /// Define a table on the store.
    pub async fn install(&self, schema: TableSchema) -> StoreResult<()> {
        let table = schema.table_name.clone();
        self.client()?.create_table(schema).await?;
        info!(%table, "table installed");
        Ok(())
    }
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection")
            .field("prefix", &self.config.db_prefix)
            .field("connected", &self.is_connected())
            .field("ids", &self.ids)
            .finish()
    }
}
