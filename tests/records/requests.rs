//! Request Record Tests

use crate::*;
use whimbrel::{FixedIds, DEFAULT_SOURCE};
use whimbrel_engine::is_uuid_format;

#[tokio::test]
async fn test_request_id_is_name_and_uuid() {
    let wb = create_whimbrel();
    for name in ["import", "nightly_report", "a::b", ""] {
        let id = wb.requests.create(name).await.unwrap();
        let uuid = id
            .strip_prefix(&format!("{}::", name))
            .unwrap_or_else(|| panic!("{} lacks prefix {}::", id, name));
        assert!(is_uuid_format(uuid), "{} is not a v4 uuid", uuid);

        let stored = wb.requests.read(&id).await.unwrap();
        assert_eq!(stored.workflow_name(), name);
    }
}

#[tokio::test]
async fn test_request_defaults() {
    let wb = create_whimbrel();
    let id = wb.requests.create("import").await.unwrap();
    let stored = wb.requests.read(&id).await.unwrap();

    assert_eq!(stored.source(), DEFAULT_SOURCE);
    assert!(stored.manual());
    let parts = stored.when().parts();
    assert!((0..12).contains(&parts[1]), "month is zero-based");
}

#[tokio::test]
async fn test_request_custom_source() {
    let wb = create_whimbrel();
    let id = wb
        .requests
        .create_with("import", RequestOptions::default().source("api").manual(false))
        .await
        .unwrap();
    let stored = wb.requests.read(&id).await.unwrap();
    assert_eq!(stored.source(), "api");
    assert!(!stored.manual());
}

#[tokio::test]
async fn test_request_ids_unique() {
    let wb = create_whimbrel();
    let mut ids = std::collections::HashSet::new();
    for _ in 0..50 {
        assert!(ids.insert(wb.requests.create("import").await.unwrap()));
    }
}

#[tokio::test]
async fn test_duplicate_request_rejected_and_original_kept() {
    let wb = Whimbrel::builder()
        .id_generator(Arc::new(FixedIds::new("00000000-0000-4000-8000-000000000000")))
        .open()
        .unwrap();
    let id = wb.requests.create("import").await.unwrap();
    let before = wb.requests.read(&id).await.unwrap();

    let err = wb
        .requests
        .create_with("import", RequestOptions::default().source("other"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateIdentifier { .. }));
    assert!(err.is_conflict());

    assert_eq!(wb.requests.read(&id).await.unwrap(), before);
}

#[tokio::test]
async fn test_read_missing_request() {
    let wb = create_whimbrel();
    let err = wb.requests.read("import::missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_corrupt_request_record() {
    let (wb, store) = create_whimbrel_with_store().await;
    store
        .put(
            PutItemRequest::new(wb.table_name("workflow_request"))
                .attribute("workflow_request_id", "import::x")
                .attribute("workflow_name", "import"),
        )
        .unwrap();

    let err = wb.requests.read("import::x").await.unwrap_err();
    assert!(matches!(err, Error::CorruptRecord { .. }), "{}", err);
}

#[tokio::test]
async fn test_read_request_without_manual_or_when_list() {
    let (wb, store) = create_whimbrel_with_store().await;
    store
        .put(
            PutItemRequest::new(wb.table_name("workflow_request"))
                .attribute("workflow_request_id", "import::legacy")
                .attribute("workflow_name", "import")
                .attribute("when_epoch", whimbrel::AttributeValue::n(1_700_000_000))
                .attribute("source", "whimbrel_lambda"),
        )
        .unwrap();

    let stored = wb.requests.read("import::legacy").await.unwrap();
    assert_eq!(stored.workflow_name(), "import");
    assert_eq!(stored.source(), "whimbrel_lambda");
    assert!(!stored.manual());
    assert_eq!(stored.when().epoch_millis(), 1_700_000_000_000);
    assert_eq!(stored.when().parts(), [2023, 10, 14, 22, 13, 20]);
}
