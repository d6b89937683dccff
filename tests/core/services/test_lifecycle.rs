// Integration tests for the index lifecycle

use crate::common::{create_disk_services, create_memory_services, malformed_analysis, valid_analysis};
use serde_json::json;
use tempfile::TempDir;
use tessera::core::analysis::analyze;
use tessera::core::metadata::{IndexSettings, Mappings, Property, PropertyType};
use tessera::core::types::StorageType;

fn analysis_settings() -> IndexSettings {
    IndexSettings {
        analysis: Some(valid_analysis()),
        ..IndexSettings::default()
    }
}

#[test]
fn test_disk_index_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let services = create_disk_services(&dir);
        let index = services
            .create_index("articles", Some(StorageType::Disk), Some(analysis_settings()), None)
            .unwrap();

        let writer = index.get_writer().unwrap();
        writer
            .add_document("1", &json!({ "title": "Tantivy" }))
            .unwrap();
        writer
            .add_document("2", &json!({ "title": "Tessera" }))
            .unwrap();
        writer.commit().unwrap();

        let definition = services.sync_index("articles").unwrap();
        assert_eq!(definition.docs_count, 2);
        assert!(definition.storage_size > 0);
        services.shutdown().unwrap();
    }

    let services = create_disk_services(&dir);
    assert_eq!(services.load_indexes().unwrap(), 1);

    let index = services.get_index("articles").unwrap();
    assert_eq!(index.docs_count(), 2);
    assert!(!index.has_writer());
    assert_eq!(index.analyzer_names(), vec!["default", "plain"]);

    // Reopening the segments yields the same count
    assert_eq!(index.get_reader().unwrap().count().unwrap(), 2);
}

#[test]
fn test_stored_default_analyzer_is_active_after_restart() {
    let dir = TempDir::new().unwrap();
    create_disk_services(&dir)
        .create_index("articles", None, Some(analysis_settings()), None)
        .unwrap();

    let services = create_disk_services(&dir);
    services.load_indexes().unwrap();
    let index = services.get_index("articles").unwrap();

    let default = index.analyzer("default").unwrap();
    assert_eq!(analyze(&default, "Tant"), vec!["ta", "tan", "tant"]);
}

#[test]
fn test_corrupt_stored_analysis_fails_startup() {
    let dir = TempDir::new().unwrap();
    let services = create_disk_services(&dir);
    services.create_index("good", None, None, None).unwrap();

    // Write a definition whose analysis no longer builds
    let mut broken = services.get_index("good").unwrap().definition();
    broken.name = "broken".to_string();
    broken.settings = Some(IndexSettings {
        analysis: Some(malformed_analysis()),
        ..IndexSettings::default()
    });
    services.metadata.put(&broken).unwrap();

    let restarted = create_disk_services(&dir);
    let err = restarted.load_indexes().unwrap_err();
    assert!(err.to_string().contains("parse stored analysis error"));
    assert!(restarted.registry.is_empty());
}

#[test]
fn test_create_rejects_invalid_configuration() {
    let services = create_memory_services();

    let bad_analysis = IndexSettings {
        analysis: Some(malformed_analysis()),
        ..IndexSettings::default()
    };
    assert!(services
        .create_index("logs", None, Some(bad_analysis), None)
        .unwrap_err()
        .is_bad_request());

    let unknown_analyzer = Mappings::default().with_property(
        "body",
        Property::new(PropertyType::Text).with_analyzer("missing"),
    );
    assert!(services
        .create_index("logs", None, None, Some(unknown_analyzer))
        .unwrap_err()
        .is_bad_request());

    // Nothing was persisted or registered
    assert!(services.registry.is_empty());
    assert!(services.metadata.get("logs").unwrap().is_none());
}

#[test]
fn test_object_store_index_fails_to_open_but_stays_registered() {
    let services = create_memory_services();
    let index = services
        .create_index("remote", Some(StorageType::ObjectStore), None, None)
        .unwrap();

    let err = index.get_writer().err().expect("no local object store backend");
    assert!(err.to_string().contains("no local backend"));
    assert!(services.get_index("remote").is_ok());
}

#[test]
fn test_delete_removes_storage_and_definition() {
    let dir = TempDir::new().unwrap();
    let services = create_disk_services(&dir);
    let index = services.create_index("logs", None, None, None).unwrap();
    index.get_writer().unwrap();

    let index_dir = services.config.indexes_dir().join("logs");
    assert!(index_dir.join("tantivy").is_dir());
    assert!(index_dir.join("meta.json").is_file());

    services.delete_index("logs").unwrap();

    assert!(!index_dir.exists());
    assert!(services.get_index("logs").unwrap_err().is_not_found());
    assert_eq!(create_disk_services(&dir).load_indexes().unwrap(), 0);
}

#[test]
fn test_update_settings_and_mappings_persist() {
    let services = create_memory_services();
    services.create_index("logs", None, None, None).unwrap();

    services
        .update_settings("logs", analysis_settings())
        .unwrap();
    let mappings = Mappings::default().with_property(
        "title",
        Property::new(PropertyType::Text).with_analyzer("plain"),
    );
    let definition = services.update_mappings("logs", mappings.clone()).unwrap();

    assert_eq!(definition.mappings, Some(mappings.clone()));
    let stored = services.metadata.get("logs").unwrap().unwrap();
    assert_eq!(stored.mappings, Some(mappings));
    assert_eq!(stored.settings, Some(analysis_settings()));
}

#[test]
fn test_sync_all_persists_every_index() {
    let services = create_memory_services();
    for name in ["a", "b", "c"] {
        let index = services.create_index(name, None, None, None).unwrap();
        let writer = index.get_writer().unwrap();
        writer.add_document("1", &json!({ "n": 1 })).unwrap();
        writer.commit().unwrap();
    }

    assert_eq!(services.sync_all().unwrap(), 3);
    for name in ["a", "b", "c"] {
        assert_eq!(services.metadata.get(name).unwrap().unwrap().docs_count, 1);
    }
}
