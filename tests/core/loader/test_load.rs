// Integration tests for restoring indexes from the metadata store

use crate::common::{
    capture_logs, definition_with_analysis, malformed_analysis, valid_analysis, CountingOpener,
    FailingStore,
};
use std::sync::Arc;
use tessera::core::error::TesseraError;
use tessera::core::loader::load_all;
use tessera::core::metadata::{IndexDefinition, MemoryMetadataStore};
use tessera::core::registry::IndexRegistry;
use tessera::core::storage::WriterOpener;
use tessera::core::types::StorageType;

fn opener() -> (Arc<CountingOpener>, Arc<dyn WriterOpener>) {
    let counting = Arc::new(CountingOpener::default());
    let shared: Arc<dyn WriterOpener> = counting.clone();
    (counting, shared)
}

#[test]
fn test_load_logs_one_line_per_index() {
    let store = MemoryMetadataStore::with_definitions(vec![
        IndexDefinition::new("logs", StorageType::Disk),
        IndexDefinition::new("scratch", StorageType::Memory),
    ]);
    let (_, opener) = opener();
    let registry = IndexRegistry::new();

    let logs = capture_logs(|| {
        load_all(&store, &opener, &registry).unwrap();
    });

    let lines = logs.lines_containing("Loading index...");
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("INFO"));
    assert!(lines[0].ends_with("Loading index... [logs:disk]"));
    assert!(lines[1].ends_with("Loading index... [scratch:memory]"));
}

#[test]
fn test_load_restores_every_definition() {
    let mut logs = IndexDefinition::new("logs", StorageType::Disk);
    logs.docs_count = 120;
    logs.storage_size = 4096;
    let store = MemoryMetadataStore::with_definitions(vec![
        logs,
        definition_with_analysis("products", StorageType::Memory, valid_analysis()),
        IndexDefinition::new("users", StorageType::ObjectStore),
    ]);
    let (counting, opener) = opener();
    let registry = IndexRegistry::new();

    let loaded = load_all(&store, &opener, &registry).unwrap();

    assert_eq!(loaded, 3);
    assert_eq!(registry.names(), vec!["logs", "products", "users"]);

    let logs = registry.get("logs").unwrap();
    assert_eq!(logs.storage_type(), StorageType::Disk);
    assert_eq!(logs.docs_count(), 120);
    assert_eq!(logs.storage_size(), 4096);

    let products = registry.get("products").unwrap();
    assert_eq!(products.analyzer_names(), vec!["default", "plain"]);
    assert_eq!(
        registry.get("users").unwrap().storage_type(),
        StorageType::ObjectStore
    );

    // Writers stay closed until first use
    assert_eq!(counting.open_count(), 0);
    assert!(registry.list().iter().all(|index| !index.has_writer()));
}

#[test]
fn test_malformed_analysis_aborts_whole_load() {
    let store = MemoryMetadataStore::with_definitions(vec![
        IndexDefinition::new("a-first", StorageType::Memory),
        definition_with_analysis("b-broken", StorageType::Memory, malformed_analysis()),
        IndexDefinition::new("c-last", StorageType::Memory),
    ]);
    let (_, opener) = opener();
    let registry = IndexRegistry::new();

    let err = load_all(&store, &opener, &registry).unwrap_err();

    match &err {
        TesseraError::RuntimeException { message, source } => {
            assert_eq!(message, "parse stored analysis error");
            assert!(matches!(**source, TesseraError::InvalidAnalysis(_)));
        }
        other => panic!("expected runtime exception, got {other:?}"),
    }
    assert!(err.to_string().contains("no_such_filter"));
    assert!(registry.is_empty());
}

#[test]
fn test_store_error_propagates_unchanged() {
    let (_, opener) = opener();
    let registry = IndexRegistry::new();

    let err = load_all(&FailingStore, &opener, &registry).unwrap_err();

    assert!(matches!(err, TesseraError::MetadataError(ref msg) if msg == "store offline"));
    assert!(registry.is_empty());
}

#[test]
fn test_empty_store_loads_nothing() {
    let (_, opener) = opener();
    let registry = IndexRegistry::new();

    assert_eq!(
        load_all(&MemoryMetadataStore::new(), &opener, &registry).unwrap(),
        0
    );
    assert!(registry.is_empty());
}

#[test]
fn test_second_load_replaces_entries_by_name() {
    let store = MemoryMetadataStore::with_definitions(vec![IndexDefinition::new(
        "logs",
        StorageType::Memory,
    )]);
    let (_, opener) = opener();
    let registry = IndexRegistry::new();

    load_all(&store, &opener, &registry).unwrap();
    let first = registry.get("logs").unwrap();
    load_all(&store, &opener, &registry).unwrap();

    assert_eq!(registry.len(), 1);
    assert!(!Arc::ptr_eq(&first, &registry.get("logs").unwrap()));
}

#[test]
fn test_definitions_with_empty_analysis_need_no_analyzers() {
    let store = MemoryMetadataStore::with_definitions(vec![definition_with_analysis(
        "logs",
        StorageType::Memory,
        Default::default(),
    )]);
    let (_, opener) = opener();
    let registry = IndexRegistry::new();

    load_all(&store, &opener, &registry).unwrap();
    assert!(registry.get("logs").unwrap().analyzer_names().is_empty());
}
