//! Execution Record Tests
//!
//! Creation, reconstruction and single-writer state transitions.

use crate::*;
use whimbrel::{AttributeValue, ExecState, FixedIds};

#[tokio::test]
async fn test_create_starts_requested() {
    let wb = create_whimbrel();
    let request_id = wb.requests.create("import").await.unwrap();
    let exec = wb.execs.create("import", Some(request_id.as_str())).await.unwrap();

    assert!(exec.workflow_exec_id().starts_with("import::"));
    assert_eq!(exec.workflow_name(), "import");
    assert_eq!(exec.state(), &ExecState::Requested);
    assert_eq!(exec.workflow_request_id(), Some(request_id.as_str()));
}

#[tokio::test]
async fn test_create_read_round_trip() {
    let wb = create_whimbrel();
    for request_id in [None, Some("import::r")] {
        let created = wb.execs.create("import", request_id).await.unwrap();
        let loaded = wb
            .execs
            .read(created.workflow_exec_id(), "import")
            .await
            .unwrap();

        assert_eq!(loaded.workflow_exec_id(), created.workflow_exec_id());
        assert_eq!(loaded.workflow_name(), created.workflow_name());
        assert_eq!(loaded.state(), created.state());
        assert_eq!(loaded.start_time_epoch(), created.start_time_epoch());
        assert_eq!(loaded.start_time().parts(), created.start_time().parts());
        assert_eq!(loaded.workflow_request_id(), request_id);
    }
}

#[tokio::test]
async fn test_missing_request_reference_stored_as_null() {
    let (wb, store) = create_whimbrel_with_store().await;
    let exec = wb.execs.create("import", None).await.unwrap();

    let item = store
        .get(
            &GetItemRequest::new(wb.table_name("workflow_exec"))
                .key("workflow_exec_id", exec.workflow_exec_id())
                .key("workflow_name", "import"),
        )
        .unwrap()
        .unwrap();
    assert_eq!(item.get("workflow_request_id"), Some(&AttributeValue::null()));
    assert_eq!(item.get("state"), Some(&AttributeValue::s("REQUESTED")));
    assert_eq!(
        item.get("start_time_epoch"),
        Some(&AttributeValue::n(exec.start_time_epoch()))
    );
}

#[tokio::test]
async fn test_read_missing_exec() {
    let wb = create_whimbrel();
    let err = wb.execs.read("import::missing", "import").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_set_state_uppercases_and_persists() {
    let wb = create_whimbrel();
    let mut exec = wb.execs.create("import", None).await.unwrap();

    exec.set_state("done").await.unwrap();
    assert_eq!(exec.state().as_str(), "DONE");

    let loaded = wb.execs.read(exec.workflow_exec_id(), "import").await.unwrap();
    assert_eq!(loaded.state().as_str(), "DONE");
}

#[tokio::test]
async fn test_state_sequence() {
    let wb = create_whimbrel();
    let mut exec = wb.execs.create("import", None).await.unwrap();
    for state in ["queued", "Running", "COMPLETED"] {
        exec.set_state(state).await.unwrap();
    }
    assert_eq!(exec.state(), &ExecState::Completed);
}

#[tokio::test]
async fn test_same_state_transition_allowed() {
    let wb = create_whimbrel();
    let mut exec = wb.execs.create("import", None).await.unwrap();
    exec.set_state("requested").await.unwrap();
    assert_eq!(exec.state(), &ExecState::Requested);
}

#[tokio::test]
async fn test_stale_then_refresh_then_retry() {
    let wb = create_whimbrel();
    let mut a = wb.execs.create("import", None).await.unwrap();
    let mut b = wb
        .execs
        .read(a.workflow_exec_id(), a.workflow_name())
        .await
        .unwrap();

    a.set_state("running").await.unwrap();

    let err = b.set_state("cancelled").await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, Error::StaleState { ref expected, .. } if expected == "REQUESTED"));
    assert_eq!(b.state(), &ExecState::Requested);

    b.refresh().await.unwrap();
    b.set_state("cancelled").await.unwrap();

    let loaded = wb.execs.read(a.workflow_exec_id(), "import").await.unwrap();
    assert_eq!(loaded.state(), &ExecState::Cancelled);
}

#[tokio::test]
async fn test_duplicate_exec_id_forced() {
    let wb = Whimbrel::builder()
        .id_generator(Arc::new(FixedIds::new("forced")))
        .open()
        .unwrap();
    wb.execs.create("import", None).await.unwrap();

    let err = wb.execs.create("import", None).await.unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateIdentifier {
            table: "whimbrel_workflow_exec".into(),
            id: "import::forced".into(),
        }
    );

    // Same uuid, different workflow: different key
    wb.execs.create("export", None).await.unwrap();
}

#[tokio::test]
async fn test_find_by_id() {
    let (wb, store) = create_whimbrel_with_store().await;
    let exec = wb.execs.create("import", None).await.unwrap();
    let found = wb.execs.find_by_id(exec.workflow_exec_id()).await.unwrap();
    assert_eq!(found, exec);

    // Second record under the same id with another workflow name
    store
        .put(
            PutItemRequest::new(wb.table_name("workflow_exec"))
                .attribute("workflow_exec_id", exec.workflow_exec_id())
                .attribute("workflow_name", "other")
                .attribute("state", "REQUESTED")
                .attribute("start_time_epoch", AttributeValue::n(0))
                .attribute("start_time", exec.start_time().list_attribute()),
        )
        .unwrap();
    let err = wb.execs.find_by_id(exec.workflow_exec_id()).await.unwrap_err();
    assert!(matches!(err, Error::AmbiguousResult { count: 2, .. }), "{}", err);
}

#[tokio::test]
async fn test_corrupt_exec_record() {
    let (wb, store) = create_whimbrel_with_store().await;
    let table = wb.table_name("workflow_exec");
    let base = PutItemRequest::new(&table)
        .attribute("workflow_exec_id", "import::bad")
        .attribute("workflow_name", "import")
        .attribute("start_time_epoch", AttributeValue::n(1))
        .attribute("start_time", AttributeValue::L(vec![AttributeValue::n(1)]))
        .attribute("state", "REQUESTED");
    store.put(base.clone()).unwrap();

    let err = wb.execs.read("import::bad", "import").await.unwrap_err();
    assert!(matches!(err, Error::CorruptRecord { .. }), "{}", err);

    let well_formed_time = whimbrel_engine::mk_item_time_list([2024, 0, 1, 0, 0, 0]);
    store
        .put(
            base.attribute("start_time", well_formed_time)
                .attribute("state", "not a state"),
        )
        .unwrap();
    let err = wb.execs.read("import::bad", "import").await.unwrap_err();
    assert!(matches!(err, Error::CorruptRecord { .. }), "{}", err);
}

#[tokio::test]
async fn test_lowercase_stored_state_is_corrupt() {
    let (wb, store) = create_whimbrel_with_store().await;
    let table = wb.table_name("workflow_exec");
    store
        .put(
            PutItemRequest::new(&table)
                .attribute("workflow_exec_id", "import::lower")
                .attribute("workflow_name", "import")
                .attribute("start_time_epoch", AttributeValue::n(1_704_067_200_000))
                .attribute(
                    "start_time",
                    whimbrel_engine::mk_item_time_list([2024, 0, 1, 0, 0, 0]),
                )
                .attribute("state", "running"),
        )
        .unwrap();

    let err = wb.execs.read("import::lower", "import").await.unwrap_err();
    assert!(matches!(err, Error::CorruptRecord { .. }), "{}", err);
    let err = wb.execs.find_by_id("import::lower").await.unwrap_err();
    assert!(matches!(err, Error::CorruptRecord { .. }), "{}", err);
}

#[tokio::test]
async fn test_read_rejects_record_under_other_key() {
    let memory = Arc::new(MemoryStore::new());
    let store = Arc::new(RewritingStore::new(
        Arc::clone(&memory),
        "workflow_name",
        "export",
    ));
    let wb = create_whimbrel_over(store).await;
    let exec = wb.execs.create("import", None).await.unwrap();

    let err = wb
        .execs
        .read(exec.workflow_exec_id(), "import")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CorruptRecord { .. }), "{}", err);

    // The index lookup does not go through the rewritten point read.
    let found = wb.execs.find_by_id(exec.workflow_exec_id()).await.unwrap();
    assert_eq!(found, exec);
}
