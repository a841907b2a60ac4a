//! Main entry point for whimbrel.
//!
//! [`Whimbrel`] bundles one shared connection with the request and
//! execution facades built on it.

use crate::error::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use whimbrel_core::{ConnectionOptions, StoreConfig, StoreConnector};
use whimbrel_engine::{DbConnection, IdGenerator};
use whimbrel_primitives::{all_tables, WorkflowExecs, WorkflowRequests};
use whimbrel_storage::{MemoryConnector, MemoryStore};

/// Workflow record store handle.
///
/// # Example
///
/// ```ignore
/// use whimbrel::prelude::*;
///
/// let wb = Whimbrel::ephemeral()?;
/// let request_id = wb.requests.create("nightly_import").await?;
/// let mut exec = wb.execs.create("nightly_import", Some(request_id.as_str())).await?;
/// exec.set_state("running").await?;
/// ```
pub struct Whimbrel {
    conn: Arc<DbConnection>,
    /// Workflow request records
    pub requests: WorkflowRequests,
    /// Workflow execution records
    pub execs: WorkflowExecs,
}

impl Whimbrel {
    /// Open with default configuration on a fresh in-memory store.
    ///
    /// Record tables are defined up front; all data is lost when the
    /// handle is dropped.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().open()
    }

    /// Create a builder.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let wb = Whimbrel::builder()
    ///     .prefix("staging_")
    ///     .connector(Arc::new(my_connector))
    ///     .open()?;
    /// ```
    pub fn builder() -> WhimbrelBuilder {
        WhimbrelBuilder::new()
    }

    /// Get the shared connection.
    pub fn connection(&self) -> &Arc<DbConnection> {
        &self.conn
    }

    /// Physical name of a logical table.
    pub fn table_name(&self, logical: &str) -> String {
        self.conn.table_name(logical)
    }

    /// Define the record tables on the backend.
    ///
    /// Safe to call repeatedly.
    pub async fn install_tables(&self) -> Result<()> {
        for schema in all_tables(self.conn.prefix()) {
            self.conn.install(schema).await.map_err(Error::Storage)?;
        }
        info!(prefix = %self.conn.prefix(), "record tables installed");
        Ok(())
    }

    fn from_connection(conn: Arc<DbConnection>) -> Self {
        Self {
            requests: WorkflowRequests::new(conn.clone()),
            execs: WorkflowExecs::new(conn.clone()),
            conn,
        }
    }
}

impl std::fmt::Debug for Whimbrel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Whimbrel").field("conn", &self.conn).finish()
    }
}

/// Builder for [`Whimbrel`].
///
/// Without a connector the handle runs on a fresh in-memory store with the
/// record tables already defined.
pub struct WhimbrelBuilder {
    config: StoreConfig,
    connector: Option<Arc<dyn StoreConnector>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl WhimbrelBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            connector: None,
            ids: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a TOML or JSON file.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = StoreConfig::from_file(path).map_err(Error::Storage)?;
        Ok(self)
    }

    /// Set the table prefix. An empty prefix is allowed.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.db_prefix = prefix.into();
        self
    }

    /// Set the options handed to the connector.
    pub fn connection(mut self, connection: ConnectionOptions) -> Self {
        self.config.connection = connection;
        self
    }

    /// Use a custom store connector.
    pub fn connector(mut self, connector: Arc<dyn StoreConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Run on an existing in-memory store.
    ///
    /// Tables are not defined for you; call
    /// [`Whimbrel::install_tables`] if the store lacks them.
    pub fn memory(self, store: Arc<MemoryStore>) -> Self {
        self.connector(Arc::new(MemoryConnector::new(store)))
    }

    /// Use a custom id generator.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Build the handle. No connection is made until the first operation.
    pub fn open(self) -> Result<Whimbrel> {
        let connector = match self.connector {
            Some(connector) => connector,
            None => {
                let store = MemoryStore::with_tables(all_tables(&self.config.db_prefix))
                    .map_err(Error::Storage)?;
                Arc::new(MemoryConnector::new(Arc::new(store)))
            }
        };
        let mut conn = DbConnection::new(self.config, connector);
        if let Some(ids) = self.ids {
            conn = conn.with_id_generator(ids);
        }
        Ok(Whimbrel::from_connection(Arc::new(conn)))
    }
}

impl Default for WhimbrelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
