//! Workflow request records
//!
//! A request is written once when someone asks for a workflow to run and
//! is never changed afterwards.
//!
//! ## Identifiers
//!
//! `<workflow_name>::<uuid>`, generated here. The create is guarded by
//! `attribute_not_exists(workflow_request_id)`, so a colliding id is
//! reported instead of overwriting the existing record.

use crate::error::{RecordError, RecordResult};
use crate::fields::Fields;
use crate::schema::{attr, WORKFLOW_REQUEST_TABLE};
use std::sync::Arc;
use tracing::debug;
use whimbrel_core::{AttributeValue, Condition, GetItemRequest, Item, PutItemRequest};
use whimbrel_engine::{DbConnection, Timestamp};

/// Source label written when the caller supplies none.
pub const DEFAULT_SOURCE: &str = "whimbrel_lambda";

/// Caller-controlled attributes of a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Originating system
    pub source: String,
    /// Whether a person triggered the request
    pub manual: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            manual: true,
        }
    }
}

impl RequestOptions {
    /// Set the source label
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the manual flag
    pub fn manual(mut self, manual: bool) -> Self {
        self.manual = manual;
        self
    }
}

/// A stored workflow request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRequest {
    workflow_request_id: String,
    workflow_name: String,
    when: Timestamp,
    source: String,
    manual: bool,
}

impl WorkflowRequest {
    /// Identifier, `<workflow_name>::<uuid>`
    pub fn workflow_request_id(&self) -> &str {
        &self.workflow_request_id
    }

    /// Requested workflow
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    /// Creation time
    pub fn when(&self) -> Timestamp {
        self.when
    }

    /// Originating system
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether a person triggered the request
    pub fn manual(&self) -> bool {
        self.manual
    }

    /// Records written by older clients have no `manual` flag and no
    /// `when` list; their `when_epoch` is in seconds.
    fn from_item(table: &str, item: &Item, requested_id: &str) -> RecordResult<Self> {
        let fields = Fields::new(table, item);
        fields.expect_key(attr::WORKFLOW_REQUEST_ID, requested_id)?;
        let when = if fields.contains(attr::WHEN) {
            fields.timestamp(attr::WHEN_EPOCH, attr::WHEN)?
        } else {
            fields.epoch_seconds(attr::WHEN_EPOCH)?
        };
        Ok(Self {
            workflow_request_id: requested_id.to_string(),
            workflow_name: fields.string(attr::WORKFLOW_NAME)?.to_string(),
            when,
            source: fields.string(attr::SOURCE)?.to_string(),
            manual: fields.optional_boolean(attr::MANUAL)?.unwrap_or(false),
        })
    }
}

/// Request record operations
///
/// Stateless facade over a shared [`DbConnection`].
///
/// # Example
///
/// ```ignore
/// let requests = WorkflowRequests::new(conn);
/// let id = requests.create("nightly_import").await?;
/// assert!(id.starts_with("nightly_import::"));
/// ```
#[derive(Clone)]
pub struct WorkflowRequests {
    conn: Arc<DbConnection>,
}

impl WorkflowRequests {
    /// Create a facade over a connection
    pub fn new(conn: Arc<DbConnection>) -> Self {
        Self { conn }
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &Arc<DbConnection> {
        &self.conn
    }

    fn table(&self) -> String {
        self.conn.table_name(WORKFLOW_REQUEST_TABLE)
    }

    /// Record a new request with the default source and `manual = true`.
    ///
    /// Returns the new identifier.
    pub async fn create(&self, workflow_name: &str) -> RecordResult<String> {
        self.create_with(workflow_name, RequestOptions::default())
            .await
    }

    /// Record a new request with explicit options.
    pub async fn create_with(
        &self,
        workflow_name: &str,
        options: RequestOptions,
    ) -> RecordResult<String> {
        let table = self.table();
        let id = format!("{}::{}", workflow_name, self.conn.mk_uuid());
        let when = self.conn.mk_time();

        let request = PutItemRequest::new(&table)
            .attribute(attr::WORKFLOW_REQUEST_ID, id.as_str())
            .attribute(attr::WORKFLOW_NAME, workflow_name)
            .attribute(attr::WHEN_EPOCH, when.epoch_attribute())
            .attribute(attr::WHEN, when.list_attribute())
            .attribute(attr::SOURCE, options.source)
            .attribute(attr::MANUAL, options.manual)
            .condition(Condition::attribute_not_exists(attr::WORKFLOW_REQUEST_ID));

        match self.conn.create(request).await {
            Ok(()) => {
                debug!(workflow_request_id = %id, "workflow request created");
                Ok(id)
            }
            Err(e) if e.is_condition_failure() => {
                Err(RecordError::DuplicateIdentifier { table, id })
            }
            Err(e) => Err(RecordError::Storage(e)),
        }
    }

    /// Fetch a request by identifier.
    pub async fn read(&self, workflow_request_id: &str) -> RecordResult<WorkflowRequest> {
        let table = self.table();
        let item = self
            .conn
            .read(GetItemRequest::new(&table).key(attr::WORKFLOW_REQUEST_ID, workflow_request_id))
            .await
            .map_err(RecordError::Storage)?
            .ok_or_else(|| RecordError::NotFound {
                table: table.clone(),
                key: format!(
                    "{} = {}",
                    attr::WORKFLOW_REQUEST_ID,
                    AttributeValue::s(workflow_request_id)
                ),
            })?;
        WorkflowRequest::from_item(&table, &item, workflow_request_id)
    }
}

impl std::fmt::Debug for WorkflowRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowRequests")
            .field("table", &self.table())
            .finish()
    }
}
