//! Table definitions
//!
//! Logical table names, attribute names and key schemas of the record
//! tables. Physical names are the logical names behind the connection's
//! prefix.

use whimbrel_core::{KeyAttribute, ScalarType, TableSchema};
use whimbrel_engine::table_name;

/// Logical name of the request table
pub const WORKFLOW_REQUEST_TABLE: &str = "workflow_request";
/// Logical name of the execution table
pub const WORKFLOW_EXEC_TABLE: &str = "workflow_exec";

pub(crate) mod attr {
    pub const WORKFLOW_REQUEST_ID: &str = "workflow_request_id";
    pub const WORKFLOW_EXEC_ID: &str = "workflow_exec_id";
    pub const WORKFLOW_NAME: &str = "workflow_name";
    pub const WHEN: &str = "when";
    pub const WHEN_EPOCH: &str = "when_epoch";
    pub const SOURCE: &str = "source";
    pub const MANUAL: &str = "manual";
    pub const STATE: &str = "state";
    pub const START_TIME: &str = "start_time";
    pub const START_TIME_EPOCH: &str = "start_time_epoch";
}

/// `<prefix>workflow_request`: hash key `workflow_request_id`
pub fn workflow_request_schema(prefix: &str) -> TableSchema {
    TableSchema::new(
        table_name(prefix, WORKFLOW_REQUEST_TABLE),
        KeyAttribute::new(attr::WORKFLOW_REQUEST_ID, ScalarType::S),
    )
}

/// `<prefix>workflow_exec`: hash key `workflow_exec_id`, range key
/// `workflow_name`, indexed by `state` and `start_time_epoch`
pub fn workflow_exec_schema(prefix: &str) -> TableSchema {
    TableSchema::new(
        table_name(prefix, WORKFLOW_EXEC_TABLE),
        KeyAttribute::new(attr::WORKFLOW_EXEC_ID, ScalarType::S),
    )
    .with_range_key(KeyAttribute::new(attr::WORKFLOW_NAME, ScalarType::S))
    .with_index(KeyAttribute::new(attr::STATE, ScalarType::S))
    .with_index(KeyAttribute::new(attr::START_TIME_EPOCH, ScalarType::N))
}

/// Every record table under `prefix`
pub fn all_tables(prefix: &str) -> Vec<TableSchema> {
    vec![workflow_request_schema(prefix), workflow_exec_schema(prefix)]
}
