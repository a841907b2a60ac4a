//! Workflow records for whimbrel
//!
//! Stateless facades over [`DbConnection`](whimbrel_engine::DbConnection):
//! - WorkflowRequests: create-once request records
//! - WorkflowExecs / WorkflowExec: execution records with compare-and-swap
//!   state transitions
//! - ExecState: lifecycle state tokens
//! - RecordError: what callers see when a record operation fails

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
mod fields;
pub mod schema;
pub mod state;
pub mod workflow_exec;
pub mod workflow_request;

pub use error::{RecordError, RecordResult};
pub use schema::{all_tables, workflow_exec_schema, workflow_request_schema};
pub use state::ExecState;
pub use workflow_exec::{WorkflowExec, WorkflowExecs};
pub use workflow_request::{RequestOptions, WorkflowRequest, WorkflowRequests, DEFAULT_SOURCE};
