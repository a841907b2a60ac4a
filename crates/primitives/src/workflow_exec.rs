//! Workflow execution records
//!
//! One record per execution, keyed by `(workflow_exec_id, workflow_name)`.
//!
//! ## State transitions
//!
//! `set_state` is a compare-and-swap: the store applies the new state only
//! if the stored state still equals the state this entity last saw. The
//! in-memory state changes only after the store accepted the write. A lost
//! race surfaces as [`RecordError::StaleState`]; nothing is retried here.
//! Callers that want to retry call [`WorkflowExec::refresh`] first.

use crate::error::{RecordError, RecordResult};
use crate::fields::Fields;
use crate::schema::{attr, WORKFLOW_EXEC_TABLE};
use crate::state::ExecState;
use std::sync::Arc;
use tracing::debug;
use whimbrel_core::request::render_key;
use whimbrel_core::{
    AttributeValue, Condition, GetItemRequest, Item, PutItemRequest, UpdateItemRequest,
};
use whimbrel_engine::{DbConnection, Timestamp};

/// A workflow execution and its last known state.
#[derive(Clone)]
pub struct WorkflowExec {
    conn: Arc<DbConnection>,
    workflow_exec_id: String,
    workflow_name: String,
    workflow_request_id: Option<String>,
    state: ExecState,
    start_time: Timestamp,
}

impl WorkflowExec {
    /// Identifier, `<workflow_name>::<uuid>`
    pub fn workflow_exec_id(&self) -> &str {
        &self.workflow_exec_id
    }

    /// Workflow being executed
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    /// Request this execution was created for, if any
    pub fn workflow_request_id(&self) -> Option<&str> {
        self.workflow_request_id.as_deref()
    }

    /// Last known state
    pub fn state(&self) -> &ExecState {
        &self.state
    }

    /// Creation time
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Creation time, milliseconds since the Unix epoch
    pub fn start_time_epoch(&self) -> i64 {
        self.start_time.epoch_millis()
    }

    fn table(&self) -> String {
        self.conn.table_name(WORKFLOW_EXEC_TABLE)
    }

    /// Move to `new_state` if the stored state is still the one this entity
    /// last saw.
    ///
    /// `new_state` is case-insensitive and stored uppercase.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the token cannot be stored
    /// - `StaleState` if another writer changed the state first
    /// - `Storage` for any other store failure
    ///
    /// On error the in-memory state is unchanged.
    pub async fn set_state(&mut self, new_state: &str) -> RecordResult<()> {
        let next = ExecState::parse(new_state)?;
        let request = UpdateItemRequest::new(self.table())
            .key(attr::WORKFLOW_EXEC_ID, self.workflow_exec_id.as_str())
            .key(attr::WORKFLOW_NAME, self.workflow_name.as_str())
            .set(attr::STATE, next.as_str())
            .condition(Condition::equals(attr::STATE, self.state.as_str()));

        match self.conn.update(request).await {
            Ok(_) => {
                debug!(
                    workflow_exec_id = %self.workflow_exec_id,
                    from = %self.state,
                    to = %next,
                    "state changed"
                );
                self.state = next;
                Ok(())
            }
            Err(e) if e.is_condition_failure() => Err(RecordError::StaleState {
                workflow_exec_id: self.workflow_exec_id.clone(),
                expected: self.state.to_string(),
            }),
            Err(e) => Err(RecordError::Storage(e)),
        }
    }

    /// Reload this execution from the store.
    pub async fn refresh(&mut self) -> RecordResult<()> {
        let fresh = WorkflowExecs::new(Arc::clone(&self.conn))
            .read(&self.workflow_exec_id, &self.workflow_name)
            .await?;
        *self = fresh;
        Ok(())
    }

    fn from_item(conn: Arc<DbConnection>, table: &str, item: &Item) -> RecordResult<Self> {
        let fields = Fields::new(table, item);
        let stored_state = fields.string(attr::STATE)?;
        let state = ExecState::from_stored(stored_state).ok_or_else(|| {
            RecordError::corrupt(table, format!("unusable state {:?}", stored_state))
        })?;
        Ok(Self {
            conn,
            workflow_exec_id: fields.string(attr::WORKFLOW_EXEC_ID)?.to_string(),
            workflow_name: fields.string(attr::WORKFLOW_NAME)?.to_string(),
            workflow_request_id: fields
                .optional_string(attr::WORKFLOW_REQUEST_ID)?
                .map(str::to_string),
            state,
            start_time: fields.timestamp(attr::START_TIME_EPOCH, attr::START_TIME)?,
        })
    }
}

impl PartialEq for WorkflowExec {
    fn eq(&self, other: &Self) -> bool {
        self.workflow_exec_id == other.workflow_exec_id
            && self.workflow_name == other.workflow_name
            && self.workflow_request_id == other.workflow_request_id
            && self.state == other.state
            && self.start_time == other.start_time
    }
}

impl std::fmt::Debug for WorkflowExec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowExec")
            .field("workflow_exec_id", &self.workflow_exec_id)
            .field("workflow_name", &self.workflow_name)
            .field("workflow_request_id", &self.workflow_request_id)
            .field("state", &self.state)
            .field("start_time_epoch", &self.start_time.epoch_millis())
            .finish()
    }
}

/// Execution record operations
///
/// Stateless facade over a shared [`DbConnection`].
///
/// # Example
///
/// ```ignore
/// let execs = WorkflowExecs::new(conn);
/// let mut exec = execs.create("nightly_import", Some(request_id.as_str())).await?;
/// exec.set_state("running").await?;
/// ```
#[derive(Clone)]
pub struct WorkflowExecs {
    conn: Arc<DbConnection>,
}

impl WorkflowExecs {
    /// Create a facade over a connection
    pub fn new(conn: Arc<DbConnection>) -> Self {
        Self { conn }
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &Arc<DbConnection> {
        &self.conn
    }

    fn table(&self) -> String {
        self.conn.table_name(WORKFLOW_EXEC_TABLE)
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Record a new execution in state `REQUESTED`.
    pub async fn create(
        &self,
        workflow_name: &str,
        workflow_request_id: Option<&str>,
    ) -> RecordResult<WorkflowExec> {
        let table = self.table();
        let exec = WorkflowExec {
            conn: Arc::clone(&self.conn),
            workflow_exec_id: format!("{}::{}", workflow_name, self.conn.mk_uuid()),
            workflow_name: workflow_name.to_string(),
            workflow_request_id: workflow_request_id.map(str::to_string),
            state: ExecState::Requested,
            start_time: self.conn.mk_time(),
        };

        let request_ref = match &exec.workflow_request_id {
            Some(id) => AttributeValue::s(id.as_str()),
            None => AttributeValue::null(),
        };
        let request = PutItemRequest::new(&table)
            .attribute(attr::WORKFLOW_EXEC_ID, exec.workflow_exec_id.as_str())
            .attribute(attr::WORKFLOW_NAME, workflow_name)
            .attribute(attr::START_TIME_EPOCH, exec.start_time.epoch_attribute())
            .attribute(attr::START_TIME, exec.start_time.list_attribute())
            .attribute(attr::STATE, exec.state.as_str())
            .attribute(attr::WORKFLOW_REQUEST_ID, request_ref)
            .condition(Condition::attribute_not_exists(attr::WORKFLOW_EXEC_ID));

        match self.conn.create(request).await {
            Ok(()) => {
                debug!(workflow_exec_id = %exec.workflow_exec_id, "workflow exec created");
                Ok(exec)
            }
            Err(e) if e.is_condition_failure() => Err(RecordError::DuplicateIdentifier {
                table,
                id: exec.workflow_exec_id,
            }),
            Err(e) => Err(RecordError::Storage(e)),
        }
    }

    // ========================================================================
    // Read
    // ========================================================================

    /// Fetch an execution by its full key.
    ///
    /// A stored record whose key fields differ from the requested ones is
    /// reported as `CorruptRecord`.
    pub async fn read(
        &self,
        workflow_exec_id: &str,
        workflow_name: &str,
    ) -> RecordResult<WorkflowExec> {
        let table = self.table();
        let request = GetItemRequest::new(&table)
            .key(attr::WORKFLOW_EXEC_ID, workflow_exec_id)
            .key(attr::WORKFLOW_NAME, workflow_name);
        let key = render_key(&request.key);

        let item = self
            .conn
            .read(request)
            .await
            .map_err(RecordError::Storage)?
            .ok_or_else(|| RecordError::NotFound {
                table: table.clone(),
                key,
            })?;

        let fields = Fields::new(&table, &item);
        fields.expect_key(attr::WORKFLOW_EXEC_ID, workflow_exec_id)?;
        fields.expect_key(attr::WORKFLOW_NAME, workflow_name)?;
        WorkflowExec::from_item(Arc::clone(&self.conn), &table, &item)
    }

    /// Fetch an execution by identifier alone.
    ///
    /// Fails with `AmbiguousResult` if more than one workflow name is stored
    /// under the identifier.
    pub async fn find_by_id(&self, workflow_exec_id: &str) -> RecordResult<WorkflowExec> {
        let table = self.table();
        let item = self
            .conn
            .read_by_key(&table, attr::WORKFLOW_EXEC_ID, workflow_exec_id)
            .await
            .map_err(RecordError::from)?;

        Fields::new(&table, &item).expect_key(attr::WORKFLOW_EXEC_ID, workflow_exec_id)?;
        WorkflowExec::from_item(Arc::clone(&self.conn), &table, &item)
    }
}

impl std::fmt::Debug for WorkflowExecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowExecs")
            .field("table", &self.table())
            .finish()
    }
}
