//! In-memory key-value store
//!
//! DashMap of tables, each table a DashMap of items keyed by primary key.
//!
//! # Design
//!
//! - Outer DashMap: table name to table, read-mostly after setup
//! - Inner DashMap (FxHash): primary key to item, sharded writes
//! - Conditional writes evaluate their condition while holding the item's
//!   entry guard, so check-and-write is atomic per key
//!
//! # Thread Safety
//!
//! All operations are thread-safe:
//! - get(): read guard on one inner shard
//! - put()/update(): only lock the target item's shard
//! - Different keys never observe each other's conditions

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::cmp::Ordering as CmpOrdering;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use whimbrel_core::{
    AttributeValue, Condition, GetItemRequest, Item, KeyValueStore, PutItemRequest, QueryOutput,
    QueryRequest, StoreError, StoreResult, TableSchema, UpdateItemRequest,
};

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Typed primary key of a stored item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    /// Partition key value
    pub hash: AttributeValue,
    /// Sort key value, for composite-key tables
    pub range: Option<AttributeValue>,
}

/// One table: its schema and its items.
#[derive(Debug)]
pub struct Table {
    schema: TableSchema,
    items: DashMap<ItemKey, Item, FxBuildHasher>,
}

impl Table {
    fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            items: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Key schema of this table
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the table holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn key_of(&self, attrs: &Item, exact: bool) -> StoreResult<ItemKey> {
        let (hash, range) = if exact {
            self.schema.extract_exact_key(attrs)?
        } else {
            self.schema.extract_key(attrs)?
        };
        Ok(ItemKey { hash, range })
    }
}

fn check_condition(
    table: &str,
    condition: Option<&Condition>,
    existing: Option<&Item>,
) -> StoreResult<()> {
    match condition {
        Some(c) if !c.evaluate(existing) => Err(StoreError::ConditionalCheckFailed {
            table: table.to_string(),
            condition: c.to_string(),
        }),
        _ => Ok(()),
    }
}

fn range_order(a: &Option<AttributeValue>, b: &Option<AttributeValue>) -> CmpOrdering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.to_string().cmp(&b.to_string()),
        },
        (None, None) => CmpOrdering::Equal,
        (None, Some(_)) => CmpOrdering::Less,
        (Some(_), None) => CmpOrdering::Greater,
    }
}

/// In-memory store - DashMap by table, DashMap by key within
///
/// # Example
///
/// ```ignore
/// use whimbrel_storage::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.define_table(schema)?;
/// store.put(PutItemRequest::new("t").attribute("id", "a"))?;
/// ```
pub struct MemoryStore {
    /// Tables by physical name
    tables: DashMap<String, Arc<Table>>,
    /// Count of applied writes
    version: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store with no tables
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            version: AtomicU64::new(0),
        }
    }

    /// Create a store with the given tables defined
    pub fn with_tables(schemas: impl IntoIterator<Item = TableSchema>) -> StoreResult<Self> {
        let store = Self::new();
        for schema in schemas {
            store.define_table(schema)?;
        }
        Ok(store)
    }

    /// Number of writes applied so far
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    #[inline]
    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of defined tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Check if a table is defined
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Number of items in a table (0 if undefined)
    pub fn item_count(&self, name: &str) -> usize {
        self.tables.get(name).map(|t| t.len()).unwrap_or(0)
    }

    /// Total items across all tables
    pub fn total_items(&self) -> usize {
        self.tables.iter().map(|entry| entry.value().len()).sum()
    }

    fn table(&self, name: &str) -> StoreResult<Arc<Table>> {
        self.tables
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    // ========================================================================
    // Table definition
    // ========================================================================

    /// Define a table
    ///
    /// Idempotent for an identical schema; redefining a table with a
    /// different schema is rejected.
    pub fn define_table(&self, schema: TableSchema) -> StoreResult<()> {
        if schema.table_name.is_empty() {
            return Err(StoreError::InvalidRequest("table name is empty".into()));
        }
        match self.tables.entry(schema.table_name.clone()) {
            Entry::Occupied(existing) => {
                if existing.get().schema == schema {
                    Ok(())
                } else {
                    Err(StoreError::InvalidRequest(format!(
                        "table {} already exists with a different schema",
                        schema.table_name
                    )))
                }
            }
            Entry::Vacant(slot) => {
                debug!(table = %schema.table_name, keys = ?schema.key_names(), "defined table");
                slot.insert(Arc::new(Table::new(schema)));
                Ok(())
            }
        }
    }

    // ========================================================================
    // Item operations
    // ========================================================================

    /// Get an item by exact key
    pub fn get(&self, request: &GetItemRequest) -> StoreResult<Option<Item>> {
        request.validate()?;
        let table = self.table(&request.table_name)?;
        let key = table.key_of(&request.key, true)?;
        Ok(table.items.get(&key).map(|item| item.value().clone()))
    }

    /// Insert or replace an item if its condition holds
    pub fn put(&self, request: PutItemRequest) -> StoreResult<()> {
        request.validate()?;
        let PutItemRequest {
            table_name,
            item,
            condition,
        } = request;
        let table = self.table(&table_name)?;
        let key = table.key_of(&item, false)?;

        match table.items.entry(key) {
            Entry::Occupied(mut slot) => {
                check_condition(&table_name, condition.as_ref(), Some(slot.get()))?;
                slot.insert(item);
            }
            Entry::Vacant(slot) => {
                check_condition(&table_name, condition.as_ref(), None)?;
                slot.insert(item);
            }
        }
        self.next_version();
        Ok(())
    }

    /// Apply `SET` clauses if the condition holds
    ///
    /// A missing item is created from the key plus the set attributes, as
    /// long as the condition holds against "no item".
    pub fn update(&self, request: UpdateItemRequest) -> StoreResult<Item> {
        request.validate()?;
        let UpdateItemRequest {
            table_name,
            key,
            set,
            condition,
        } = request;
        let table = self.table(&table_name)?;
        let item_key = table.key_of(&key, true)?;

        let updated = match table.items.entry(item_key) {
            Entry::Occupied(mut slot) => {
                check_condition(&table_name, condition.as_ref(), Some(slot.get()))?;
                let item = slot.get_mut();
                for (name, value) in set {
                    item.insert(name, value);
                }
                item.clone()
            }
            Entry::Vacant(slot) => {
                check_condition(&table_name, condition.as_ref(), None)?;
                let mut item = key;
                for (name, value) in set {
                    item.insert(name, value);
                }
                slot.insert(item.clone());
                item
            }
        };
        self.next_version();
        Ok(updated)
    }

    /// Return the items of one partition, ordered by range key
    ///
    /// NOTE: scans the table. Acceptable because partition queries are not
    /// on the hot path.
    pub fn query(&self, request: &QueryRequest) -> StoreResult<QueryOutput> {
        request.validate()?;
        let table = self.table(&request.table_name)?;
        if table.schema.hash_key.name != request.key_name {
            return Err(StoreError::InvalidRequest(format!(
                "{} is not the hash key of {}",
                request.key_name, request.table_name
            )));
        }

        let mut matches: Vec<(ItemKey, Item)> = table
            .items
            .iter()
            .filter(|entry| entry.key().hash == request.key_value)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        matches.sort_by(|(a, _), (b, _)| range_order(&a.range, &b.range));
        if let Some(limit) = request.limit {
            matches.truncate(limit);
        }

        Ok(QueryOutput {
            items: matches.into_iter().map(|(_, item)| item).collect(),
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("table_count", &self.table_count())
            .field("version", &self.version())
            .field("total_items", &self.total_items())
            .finish()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn create_table(&self, schema: TableSchema) -> StoreResult<()> {
        self.define_table(schema)
    }

    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>> {
        self.get(&request)
    }

    async fn put_item(&self, request: PutItemRequest) -> StoreResult<()> {
        self.put(request)
    }

    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<Item> {
        self.update(request)
    }

    async fn query(&self, request: QueryRequest) -> StoreResult<QueryOutput> {
        let output = MemoryStore::query(self, &request)?;
        if output.items.is_empty() {
            debug!(
                table = %request.table_name,
                key = %format!("{} = {}", request.key_name, request.key_value),
                "query matched nothing"
            );
        }
        Ok(output)
    }
}
