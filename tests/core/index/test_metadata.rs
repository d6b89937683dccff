// Integration tests for statistics refresh

use crate::common::{create_memory_services, CountingOpener};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tessera::core::index::Index;
use tessera::core::metadata::IndexDefinition;
use tessera::core::types::StorageType;

#[test]
fn test_open_refreshes_statistics() {
    let opener = Arc::new(CountingOpener::default());
    let mut def = IndexDefinition::new("logs", StorageType::Memory);
    def.docs_count = 42;
    let index = Index::from_definition(def, opener.clone()).unwrap();
    assert_eq!(index.docs_count(), 42);

    // A fresh stub writer reports zero committed documents
    index.get_writer().unwrap();
    assert_eq!(index.docs_count(), 0);
    assert_eq!(opener.last_handle().reader_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_count_converges_after_commit() {
    let opener = Arc::new(CountingOpener::default());
    let index = Index::new("logs", StorageType::Memory, opener.clone());
    let writer = index.get_writer().unwrap();

    for i in 0..5 {
        writer
            .add_document(&i.to_string(), &json!({ "n": i }))
            .unwrap();
    }
    index.update_metadata();
    assert_eq!(index.docs_count(), 0, "uncommitted documents are not counted");

    writer.commit().unwrap();
    index.update_metadata();
    assert_eq!(index.docs_count(), 5);
}

#[test]
fn test_failed_count_keeps_previous_value() {
    let opener = Arc::new(CountingOpener::default());
    let index = Index::new("logs", StorageType::Memory, opener.clone());
    let writer = index.get_writer().unwrap();
    let stub = opener.last_handle();

    writer.add_document("a", &json!({})).unwrap();
    writer.add_document("b", &json!({})).unwrap();
    writer.commit().unwrap();
    index.update_metadata();
    assert_eq!(index.docs_count(), 2);

    writer.add_document("c", &json!({})).unwrap();
    writer.commit().unwrap();

    stub.fail_count.store(true, Ordering::SeqCst);
    index.update_metadata();
    assert_eq!(index.docs_count(), 2);

    stub.fail_count.store(false, Ordering::SeqCst);
    stub.fail_reader.store(true, Ordering::SeqCst);
    index.update_metadata();
    assert_eq!(index.docs_count(), 2);

    stub.fail_reader.store(false, Ordering::SeqCst);
    index.update_metadata();
    assert_eq!(index.docs_count(), 3);
}

#[test]
fn test_storage_size_follows_status() {
    let opener = Arc::new(CountingOpener::default());
    let index = Index::new("logs", StorageType::Disk, opener.clone());
    index.get_writer().unwrap();
    let stub = opener.last_handle();

    stub.on_disk_bytes.store(8192, Ordering::SeqCst);
    stub.fail_count.store(true, Ordering::SeqCst);
    index.update_metadata();

    // Size refreshes even when the count does not
    assert_eq!(index.storage_size(), 8192);
}

#[test]
fn test_refresh_failure_does_not_fail_open() {
    let opener = Arc::new(CountingOpener::default());
    opener.broken_readers.store(true, Ordering::SeqCst);

    let mut def = IndexDefinition::new("logs", StorageType::Memory);
    def.docs_count = 7;
    let index = Index::from_definition(def, opener.clone()).unwrap();

    assert!(index.get_writer().is_ok());
    assert_eq!(index.docs_count(), 7);
    assert_eq!(opener.last_handle().reader_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_tantivy_counts_converge() {
    let services = create_memory_services();
    let index = services.create_index("events", None, None, None).unwrap();
    let writer = index.get_writer().unwrap();

    for i in 0..3 {
        writer
            .add_document(&format!("doc-{i}"), &json!({ "message": format!("event {i}") }))
            .unwrap();
    }
    // Same id replaces the earlier document
    writer
        .add_document("doc-0", &json!({ "message": "replaced" }))
        .unwrap();
    writer.commit().unwrap();

    index.update_metadata();
    assert_eq!(index.docs_count(), 3);

    writer.delete_document("doc-1").unwrap();
    writer.commit().unwrap();
    index.update_metadata();
    assert_eq!(index.docs_count(), 2);
    assert_eq!(index.storage_size(), 0, "memory indexes occupy no disk");
}
