// Integration tests for lazy writer acquisition

use crate::common::{
    definition_with_analysis, same_handle, valid_analysis, CountingOpener, FailingOpener,
};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tessera::core::index::Index;
use tessera::core::metadata::IndexDefinition;
use tessera::core::types::StorageType;

#[test]
fn test_fast_path_opens_once() {
    let opener = Arc::new(CountingOpener::default());
    let index = Index::new("logs", StorageType::Memory, opener.clone());

    let first = index.get_writer().expect("first open should succeed");
    for _ in 0..10 {
        let again = index.get_writer().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    assert_eq!(opener.open_count(), 1);
}

#[test]
fn test_concurrent_first_open_is_single() {
    const THREADS: usize = 16;

    let opener = Arc::new(CountingOpener::with_delay(Duration::from_millis(20)));
    let index = Arc::new(Index::new("logs", StorageType::Memory, opener.clone()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                index.get_writer().unwrap()
            })
        })
        .collect();

    let writers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(opener.open_count(), 1);
    let opened = opener.last_handle();
    for writer in &writers {
        assert!(same_handle(writer, &opened));
    }
    assert!(same_handle(&index.get_writer().unwrap(), &opened));
}

#[test]
fn test_statistics_readable_while_writer_opens() {
    let opener = Arc::new(CountingOpener::with_delay(Duration::from_millis(800)));
    let definition = IndexDefinition {
        docs_count: 7,
        ..IndexDefinition::new("slow", StorageType::Disk)
    };
    let index = Arc::new(Index::from_definition(definition, opener.clone()).unwrap());

    let opening = {
        let index = Arc::clone(&index);
        thread::spawn(move || index.get_writer().map(|_| ()))
    };
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    assert_eq!(index.docs_count(), 7);
    assert!(!index.summary().writer_open);
    index.definition();
    let waited = started.elapsed();
    assert!(
        waited < Duration::from_millis(200),
        "statistics reads waited {waited:?} on the open"
    );

    opening.join().unwrap().unwrap();
    assert!(index.has_writer());
    assert_eq!(opener.open_count(), 1);
}

#[test]
fn test_open_error_propagates_and_is_not_cached() {
    let opener = Arc::new(FailingOpener::times(2));
    let index = Index::new("logs", StorageType::Disk, opener.clone());

    let err = index.get_writer().err().expect("open should fail");
    assert!(err.to_string().contains("backend unavailable for 'logs'"));
    assert!(!index.has_writer());

    assert!(index.get_writer().is_err());
    assert!(index.get_writer().is_ok());
    assert_eq!(opener.attempt_count(), 3);

    // Cached from here on
    index.get_writer().unwrap();
    assert_eq!(opener.attempt_count(), 3);
}

#[test]
fn test_reader_returns_writer_error() {
    let opener = Arc::new(FailingOpener::always());
    let index = Index::new("logs", StorageType::Disk, opener.clone());

    let writer_err = index.get_writer().err().expect("open should fail");
    let reader_err = match index.get_reader() {
        Ok(_) => panic!("reader should not open without a writer"),
        Err(e) => e,
    };

    assert_eq!(writer_err.to_string(), reader_err.to_string());
    assert_eq!(opener.attempt_count(), 2);
}

#[test]
fn test_reader_is_derived_from_cached_writer() {
    let opener = Arc::new(CountingOpener::default());
    let index = Index::new("logs", StorageType::Memory, opener.clone());

    let reader = index.get_reader().unwrap();
    assert_eq!(reader.count().unwrap(), 0);
    index.get_reader().unwrap();

    assert_eq!(opener.open_count(), 1);
}

#[test]
fn test_default_analyzer_is_handed_to_opener() {
    let opener = Arc::new(CountingOpener::default());
    let def = definition_with_analysis("logs", StorageType::Memory, valid_analysis());
    let index = Index::from_definition(def, opener.clone()).unwrap();

    index.get_writer().unwrap();
    assert_eq!(*opener.default_analyzer_seen.lock(), vec![true]);
}

#[test]
fn test_missing_default_analyzer_falls_back() {
    let mut without_default = valid_analysis();
    without_default.analyzer.remove("default");

    let opener = Arc::new(CountingOpener::default());
    let def = definition_with_analysis("logs", StorageType::Memory, without_default);
    let index = Index::from_definition(def, opener.clone()).unwrap();
    assert_eq!(index.analyzer_names(), vec!["plain"]);

    index.get_writer().expect("no default analyzer is not an error");
    assert_eq!(*opener.default_analyzer_seen.lock(), vec![false]);
}

#[test]
fn test_no_analysis_opens_without_default() {
    let opener = Arc::new(CountingOpener::default());
    let index =
        Index::from_definition(IndexDefinition::new("logs", StorageType::Memory), opener.clone())
            .unwrap();

    index.get_writer().unwrap();
    assert_eq!(*opener.default_analyzer_seen.lock(), vec![false]);
}

#[test]
fn test_close_then_reopen() {
    let opener = Arc::new(CountingOpener::default());
    let index = Index::new("logs", StorageType::Memory, opener.clone());

    index.get_writer().unwrap();
    let first = opener.last_handle();
    index.close().unwrap();
    assert!(first.closed.load(std::sync::atomic::Ordering::SeqCst));
    assert!(!index.has_writer());

    let reopened = index.get_writer().unwrap();
    assert!(!same_handle(&reopened, &first));
    assert_eq!(opener.open_count(), 2);
}
