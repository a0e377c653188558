use graphload::testing::{MemoryStore, VecSource, numbered_records};
use graphload::{CsvSource, LoadError, LoadOptions, LoadReport, Value, run};
use std::path::{Path, PathBuf};

fn options(batch_size: usize) -> LoadOptions {
    LoadOptions {
        batch_size,
        label: "Product".to_string(),
    }
}

fn write_products_csv(dir: &Path, rows: usize) -> PathBuf {
    let mut content = String::from("sku,name,price,discontinued\n");
    for i in 0..rows {
        let discontinued = if i % 2 == 0 { "true" } else { "false" };
        content.push_str(&format!("SKU-{i},Product {i},{}.99,{discontinued}\n", i % 50));
    }
    let path = dir.join("products.csv");
    std::fs::write(&path, content).expect("write csv");
    path
}

/// 2500 rows at the default batch size of 1000 commit as 1000, 1000, 500
#[tokio::test]
async fn test_2500_rows_commit_in_three_batches() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let source = CsvSource::new(write_products_csv(tmp.path(), 2500));
    let store = MemoryStore::new();

    let report = run(&store, &source, LoadOptions::default())
        .await
        .expect("load succeeds");

    assert_eq!(store.attempted_batches(), vec![1000, 1000, 500]);
    assert_eq!(
        report,
        LoadReport {
            batches: 3,
            records: 2500
        }
    );
    assert_eq!(store.nodes().len(), 2500);
    assert_eq!(store.sessions_opened(), 1);
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn test_node_properties_match_csv_columns_exactly() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let source = CsvSource::new(write_products_csv(tmp.path(), 5));
    let store = MemoryStore::new();

    run(&store, &source, options(2)).await.expect("load succeeds");

    let nodes = store.nodes();
    assert_eq!(nodes.len(), 5);
    for node in &nodes {
        assert_eq!(node.label, "Product");
        assert_eq!(node.keys(), ["sku", "name", "price", "discontinued"]);
    }

    // Batch order follows source order
    let first = &nodes[0].properties;
    assert_eq!(first[0], ("sku".to_string(), Value::from("SKU-0")));
    assert_eq!(first[2], ("price".to_string(), Value::Float(0.99)));
    assert_eq!(first[3], ("discontinued".to_string(), Value::Boolean(true)));
    assert_eq!(nodes[4].properties[0].1, Value::from("SKU-4"));
}

/// Empty cells must not drop a key from the created node
#[tokio::test]
async fn test_empty_cells_keep_every_property() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("gaps.csv");
    std::fs::write(
        &path,
        "sku,created,price,note\nA,2024-01-01 10:00:00,,\nB,,4.5,fragile\n",
    )
    .expect("write csv");
    let store = MemoryStore::new();

    run(&store, &CsvSource::new(path), options(10))
        .await
        .expect("load succeeds");

    let nodes = store.nodes();
    assert_eq!(nodes.len(), 2);
    for node in &nodes {
        assert_eq!(node.keys(), ["sku", "created", "price", "note"]);
    }
    let first = &nodes[0].properties;
    assert_eq!(first[1].1, Value::from("2024-01-01 10:00:00"));
    assert!(matches!(first[2].1, Value::Float(x) if x.is_nan()));
    assert_eq!(first[3].1, Value::from(""));
    assert_eq!(nodes[1].properties[1].1, Value::from(""));
}

#[tokio::test]
async fn test_every_batch_uses_the_same_bulk_create_statement() {
    let store = MemoryStore::new();
    let source = VecSource::new(numbered_records(5));

    run(&store, &source, options(2)).await.expect("load succeeds");

    let statements = store.statements();
    assert_eq!(statements.len(), 3);
    assert!(
        statements
            .iter()
            .all(|s| s == "UNWIND $rows AS row CREATE (n:`Product`) SET n = row")
    );
}

#[tokio::test]
async fn test_loading_twice_duplicates_nodes() {
    let store = MemoryStore::new();
    let source = VecSource::new(numbered_records(30));

    run(&store, &source, options(8)).await.expect("first load");
    run(&store, &source, options(8)).await.expect("second load");

    assert_eq!(store.nodes().len(), 60);
    assert_eq!(store.sessions_opened(), 2);
    assert_eq!(store.sessions_closed(), 2);
}

#[tokio::test]
async fn test_header_only_source_succeeds_without_writes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let source = CsvSource::new(write_products_csv(tmp.path(), 0));
    let store = MemoryStore::new();

    let report = run(&store, &source, LoadOptions::default())
        .await
        .expect("empty load succeeds");

    assert_eq!(report, LoadReport::default());
    assert!(store.attempted_batches().is_empty());
    assert!(store.nodes().is_empty());
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn test_missing_source_file_reports_source_error_and_closes_session() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let source = CsvSource::new(tmp.path().join("nope.csv"));
    let store = MemoryStore::new();

    let err = run(&store, &source, LoadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::SourceRead { .. }));
    assert!(!err.is_partial());
    assert!(store.attempted_batches().is_empty());
    assert_eq!(store.sessions_opened(), 1);
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn test_malformed_csv_creates_no_nodes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("broken.csv");
    let mut content = String::from("a,b\n");
    for i in 0..2500 {
        content.push_str(&format!("{i},{i}\n"));
    }
    content.push_str("oops\n");
    std::fs::write(&path, content).expect("write csv");

    let store = MemoryStore::new();
    let err = run(&store, &CsvSource::new(path), options(1000))
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::SourceRead { .. }));
    assert!(store.nodes().is_empty());
    assert_eq!(store.sessions_closed(), 1);
}

/// Failure on the second of three batches: the first stays, the third never runs
#[tokio::test]
async fn test_failed_second_batch_stops_the_run() {
    let store = MemoryStore::new().failing_transaction(2);
    let source = VecSource::new(numbered_records(2500));

    let err = run(&store, &source, LoadOptions::default())
        .await
        .unwrap_err();

    match &err {
        LoadError::BatchWrite {
            batch, committed, ..
        } => {
            assert_eq!(*batch, 2);
            assert_eq!(
                *committed,
                LoadReport {
                    batches: 1,
                    records: 1000
                }
            );
        }
        other => panic!("expected BatchWrite, got {other:?}"),
    }
    assert!(err.is_partial());
    assert_eq!(store.attempted_batches(), vec![1000, 1000]);
    assert_eq!(store.nodes().len(), 1000);
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn test_failed_final_short_batch_keeps_full_batches() {
    let store = MemoryStore::new().failing_transaction(3);
    let source = VecSource::new(numbered_records(25));

    let err = run(&store, &source, options(10)).await.unwrap_err();

    assert_eq!(
        err.committed(),
        LoadReport {
            batches: 2,
            records: 20
        }
    );
    assert_eq!(store.attempted_batches(), vec![10, 10, 5]);
    assert_eq!(store.nodes().len(), 20);
}

#[tokio::test]
async fn test_refused_connection_touches_nothing() {
    let store = MemoryStore::new().refusing_connections();
    let source = VecSource::new(numbered_records(10));

    let err = run(&store, &source, LoadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Connection(_)));
    assert_eq!(store.sessions_opened(), 0);
    assert_eq!(store.sessions_closed(), 0);
    assert!(store.attempted_batches().is_empty());
}

#[tokio::test]
async fn test_unreadable_source_performs_no_flush() {
    let store = MemoryStore::new();
    let source = VecSource::unreadable("permission denied");

    let err = run(&store, &source, LoadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::SourceRead { reason, .. } if reason == "permission denied"));
    assert!(store.attempted_batches().is_empty());
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn test_read_error_mid_stream_reports_committed_batches() {
    let store = MemoryStore::new();
    let source = VecSource::new(numbered_records(50)).failing_at(23, "disk went away");

    let err = run(&store, &source, options(10)).await.unwrap_err();

    assert!(matches!(err, LoadError::SourceRead { .. }));
    assert_eq!(
        err.committed(),
        LoadReport {
            batches: 2,
            records: 20
        }
    );
    // The three buffered records after the last flush are never written
    assert_eq!(store.nodes().len(), 20);
    assert_eq!(store.sessions_closed(), 1);
}
