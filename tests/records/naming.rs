//! Naming and Configuration Tests
//!
//! Table prefixes, configuration loading and the stored item shape.

use crate::*;
use std::io::Write;
use whimbrel::{AttributeValue, MemoryConnector};

#[test]
fn test_default_table_names() {
    let wb = create_whimbrel();
    assert_eq!(wb.table_name("workflow_exec"), "whimbrel_workflow_exec");
    assert_eq!(wb.table_name("workflow_request"), "whimbrel_workflow_request");
}

#[test]
fn test_empty_prefix() {
    let wb = Whimbrel::builder().prefix("").open().unwrap();
    assert_eq!(wb.table_name("workflow_exec"), "workflow_exec");
}

#[tokio::test]
async fn test_records_land_in_prefixed_tables() {
    let store = Arc::new(MemoryStore::new());
    let wb = Whimbrel::builder()
        .prefix("staging_")
        .connector(Arc::new(MemoryConnector::new(Arc::clone(&store))))
        .open()
        .unwrap();
    wb.install_tables().await.unwrap();
    wb.install_tables().await.unwrap();

    wb.requests.create("import").await.unwrap();
    wb.execs.create("import", None).await.unwrap();

    assert_eq!(store.table_count(), 2);
    assert_eq!(store.item_count("staging_workflow_request"), 1);
    assert_eq!(store.item_count("staging_workflow_exec"), 1);
}

#[tokio::test]
async fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whimbrel.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "db_prefix = \"cfg_\"").unwrap();
    writeln!(f, "region = \"us-west-2\"").unwrap();
    writeln!(f, "maxRetries = 2").unwrap();
    drop(f);

    let wb = Whimbrel::builder().config_file(&path).unwrap().open().unwrap();
    let config = wb.connection().config();
    assert_eq!(config.db_prefix, "cfg_");
    assert_eq!(config.connection.region.as_deref(), Some("us-west-2"));
    assert_eq!(config.connection.max_retries, Some(2));

    // Default backend defines tables under the configured prefix
    let id = wb.requests.create("import").await.unwrap();
    assert!(wb.requests.read(&id).await.is_ok());
}

#[test]
fn test_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whimbrel.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = match Whimbrel::builder().config_file(&path) {
        Ok(_) => panic!("malformed config accepted"),
        Err(e) => e,
    };
    assert!(matches!(err, Error::Storage(StoreError::Config(_))));
}

#[tokio::test]
async fn test_stored_request_wire_shape() {
    let (wb, store) = create_whimbrel_with_store().await;
    let id = wb.requests.create("import").await.unwrap();

    let item = store
        .get(
            &GetItemRequest::new(wb.table_name("workflow_request"))
                .key("workflow_request_id", id.as_str()),
        )
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["workflow_request_id"]["S"], id.as_str());
    assert_eq!(json["workflow_name"]["S"], "import");
    assert_eq!(json["source"]["S"], "whimbrel_lambda");
    assert_eq!(json["manual"]["BOOL"], true);
    assert!(json["when_epoch"]["N"].is_string());
    assert_eq!(json["when"]["L"].as_array().map(Vec::len), Some(6));

    let back: whimbrel::Item = serde_json::from_value(json).unwrap();
    assert_eq!(back.get("manual"), Some(&AttributeValue::Bool(true)));
}
