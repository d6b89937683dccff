// Test helper functions

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tempfile::TempDir;
use tessera::core::analysis::AnalysisConfig;
use tessera::core::config::Config;
use tessera::core::metadata::{IndexDefinition, IndexSettings, MemoryMetadataStore};
use tessera::core::services::Services;
use tessera::core::storage::TantivyWriterOpener;
use tessera::core::types::StorageType;

/// Services over file metadata and disk-backed Tantivy in `dir`
#[allow(dead_code)] // Used in integration tests
pub fn create_disk_services(dir: &TempDir) -> Services {
    let mut config = Config::default();
    config.storage.data_dir = dir.path().to_path_buf();
    config.writer.num_threads = 1;
    config.writer.heap_size_mb = 15;

    Services::new(config)
}

/// Services over in-memory metadata and in-memory Tantivy
#[allow(dead_code)] // Used in integration tests
pub fn create_memory_services() -> Services {
    let mut config = Config::default();
    config.storage.default_storage_type = StorageType::Memory;
    config.writer.num_threads = 1;
    config.writer.heap_size_mb = 15;

    let opener = Arc::new(TantivyWriterOpener::from_config(&config));
    Services::with_components(config, Arc::new(MemoryMetadataStore::new()), opener)
}

/// Definition carrying the given analysis settings
#[allow(dead_code)] // Used in integration tests
pub fn definition_with_analysis(
    name: &str,
    storage_type: StorageType,
    analysis: AnalysisConfig,
) -> IndexDefinition {
    IndexDefinition::new(name, storage_type).with_settings(IndexSettings {
        analysis: Some(analysis),
        ..IndexSettings::default()
    })
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    #[allow(dead_code)]
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

/// Run `f` with an INFO-level subscriber writing into the returned sink
#[allow(dead_code)] // Used in integration tests
pub fn capture_logs(f: impl FnOnce()) -> CapturedLogs {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs
}
