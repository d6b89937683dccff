//! Tantivy integration for index writers.
//!
//! Indexes are schemaless from Tantivy's point of view: every
//! document is stored as its id plus the whole JSON source in one
//! JSON field, and field mappings stay a Tessera-level concern.

use super::{ReaderHandle, WriterHandle, WriterOpener, WriterStatus};
use crate::core::analysis::DEFAULT_ANALYZER;
use crate::core::config::Config;
use crate::core::error::{Result, TesseraError};
use crate::core::types::StorageType;
use parking_lot::RwLock;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tantivy::directory::MmapDirectory;
use tantivy::schema::{Field, Schema, STORED, STRING, TEXT};
use tantivy::tokenizer::TextAnalyzer;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};

/// Document id field
pub const ID_FIELD: &str = "_id";

/// Whole document source (JSON, full-text indexed)
pub const SOURCE_FIELD: &str = "_source";

/// Create the Tantivy schema shared by all indexes
///
/// Fields:
/// - _id: Document identifier (STRING | STORED)
/// - _source: Document body as JSON (TEXT | STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_text_field(ID_FIELD, STRING | STORED);
    builder.add_json_field(SOURCE_FIELD, TEXT | STORED);
    builder.build()
}

/// Opens Tantivy indexes under a data directory
#[derive(Debug, Clone)]
pub struct TantivyWriterOpener {
    /// Root directory holding one subdirectory per index
    root: PathBuf,

    /// Memory budget shared by all writer threads
    heap_size_bytes: usize,

    /// Writer threads; 0 lets Tantivy decide
    num_threads: usize,
}

impl TantivyWriterOpener {
    pub fn new(root: impl Into<PathBuf>, heap_size_bytes: usize, num_threads: usize) -> Self {
        Self {
            root: root.into(),
            heap_size_bytes,
            num_threads,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.indexes_dir(),
            config.writer.heap_size_bytes(),
            config.writer.num_threads,
        )
    }

    /// Segment directory of a disk-backed index
    pub fn index_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join("tantivy")
    }

    /// Open or create the Tantivy index `name` and its writer
    pub fn open_writer(
        &self,
        name: &str,
        storage_type: StorageType,
        default_analyzer: Option<&TextAnalyzer>,
    ) -> Result<TantivyWriter> {
        let (index, path) = match storage_type {
            StorageType::Disk => {
                let (index, path) = self.open_disk_index(name)?;
                (index, Some(path))
            }
            StorageType::Memory => (Index::create_in_ram(create_schema()), None),
            StorageType::ObjectStore => {
                return Err(TesseraError::StorageError(format!(
                    "Storage type '{storage_type}' of index '{name}' has no local backend"
                )));
            }
        };

        // Text in `_source` is tokenized with "default"
        if let Some(analyzer) = default_analyzer {
            index
                .tokenizers()
                .register(DEFAULT_ANALYZER, analyzer.clone());
        }

        let writer: IndexWriter = if self.num_threads == 0 {
            index.writer(self.heap_size_bytes)
        } else {
            index.writer_with_num_threads(self.num_threads, self.heap_size_bytes)
        }
        .map_err(|e| TesseraError::StorageError(format!("Failed to create writer: {e}")))?;

        tracing::debug!(index = name, storage = %storage_type, "Opened Tantivy writer");

        TantivyWriter::new(index, writer, path)
    }

    fn open_disk_index(&self, name: &str) -> Result<(Index, PathBuf)> {
        let path = self.index_path(name);
        fs::create_dir_all(&path)?;

        let directory = MmapDirectory::open(&path).map_err(|e| {
            TesseraError::StorageError(format!("Failed to open directory for '{name}': {e}"))
        })?;
        let index = Index::open_or_create(directory, create_schema())
            .map_err(|e| TesseraError::StorageError(format!("Failed to open index '{name}': {e}")))?;

        Ok((index, path))
    }
}

impl WriterOpener for TantivyWriterOpener {
    fn open(
        &self,
        name: &str,
        storage_type: StorageType,
        default_analyzer: Option<&TextAnalyzer>,
        _time_min: i64,
        _time_max: i64,
    ) -> Result<Arc<dyn WriterHandle>> {
        let writer = self.open_writer(name, storage_type, default_analyzer)?;
        Ok(Arc::new(writer))
    }

    fn destroy(&self, name: &str, storage_type: StorageType) -> Result<()> {
        if storage_type != StorageType::Disk {
            return Ok(());
        }

        let path = self.index_path(name);
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        // Only succeeds once the metadata store has removed its file too
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
        Ok(())
    }
}

/// Tantivy index writer wrapper
pub struct TantivyWriter {
    /// Tantivy index instance
    index: Index,

    /// Manually reloaded reader, refreshed on every snapshot request
    reader: IndexReader,

    /// `None` once closed
    writer: RwLock<Option<IndexWriter>>,

    id_field: Field,

    /// Segment directory (disk storage only)
    path: Option<PathBuf>,
}

impl std::fmt::Debug for TantivyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyWriter")
            .field("path", &self.path)
            .field("closed", &self.writer.read().is_none())
            .finish()
    }
}

impl TantivyWriter {
    fn new(index: Index, writer: IndexWriter, path: Option<PathBuf>) -> Result<Self> {
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| TesseraError::StorageError(format!("Failed to create reader: {e}")))?;

        let id_field = index
            .schema()
            .get_field(ID_FIELD)
            .map_err(|e| TesseraError::StorageError(format!("Missing {ID_FIELD} field: {e}")))?;

        Ok(Self {
            index,
            reader,
            writer: RwLock::new(Some(writer)),
            id_field,
            path,
        })
    }

    /// Get a reference to the underlying Tantivy index
    pub fn index(&self) -> &Index {
        &self.index
    }

    fn closed(&self) -> TesseraError {
        TesseraError::StorageError("Index writer is closed".to_string())
    }
}

impl WriterHandle for TantivyWriter {
    fn reader(&self) -> Result<Box<dyn ReaderHandle>> {
        self.reader
            .reload()
            .map_err(|e| TesseraError::StorageError(format!("Failed to reload reader: {e}")))?;
        Ok(Box::new(TantivyReader {
            searcher: self.reader.searcher(),
        }))
    }

    fn status(&self) -> WriterStatus {
        let num_segments = self
            .index
            .searchable_segment_metas()
            .map(|metas| metas.len())
            .unwrap_or(0);
        let on_disk_bytes = self.path.as_deref().map(directory_size).unwrap_or(0);

        WriterStatus {
            on_disk_bytes,
            num_segments,
        }
    }

    fn add_document(&self, id: &str, source: &serde_json::Value) -> Result<()> {
        if !source.is_object() {
            return Err(TesseraError::StorageError(format!(
                "Document '{id}' source must be a JSON object"
            )));
        }

        let body = json!({ ID_FIELD: id, SOURCE_FIELD: source }).to_string();
        let doc = TantivyDocument::parse_json(&self.index.schema(), &body)
            .map_err(|e| TesseraError::StorageError(format!("Invalid document '{id}': {e}")))?;

        let guard = self.writer.read();
        let writer = guard.as_ref().ok_or_else(|| self.closed())?;
        writer.delete_term(Term::from_field_text(self.id_field, id));
        writer
            .add_document(doc)
            .map_err(|e| TesseraError::StorageError(format!("Failed to add document: {e}")))?;

        Ok(())
    }

    fn delete_document(&self, id: &str) -> Result<()> {
        let guard = self.writer.read();
        let writer = guard.as_ref().ok_or_else(|| self.closed())?;
        writer.delete_term(Term::from_field_text(self.id_field, id));
        Ok(())
    }

    fn commit(&self) -> Result<u64> {
        let mut guard = self.writer.write();
        let writer = guard.as_mut().ok_or_else(|| self.closed())?;
        writer
            .commit()
            .map_err(|e| TesseraError::StorageError(format!("Failed to commit: {e}")))
    }

    fn close(&self) -> Result<()> {
        let Some(mut writer) = self.writer.write().take() else {
            return Ok(());
        };

        writer
            .commit()
            .map_err(|e| TesseraError::StorageError(format!("Failed to commit: {e}")))?;
        writer
            .wait_merging_threads()
            .map_err(|e| TesseraError::StorageError(format!("Failed to stop merging: {e}")))?;

        Ok(())
    }
}

/// Searcher snapshot taken at the last reload
pub struct TantivyReader {
    searcher: Searcher,
}

impl TantivyReader {
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }
}

impl ReaderHandle for TantivyReader {
    fn count(&self) -> Result<u64> {
        Ok(self.searcher.num_docs())
    }
}

/// Sum the sizes of regular files under `path`, skipping symlinks
fn directory_size(path: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(path) else {
        return 0;
    };

    let mut total = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            total += directory_size(&entry.path());
        } else if let Ok(metadata) = entry.metadata() {
            total += metadata.len();
        }
    }
    total
}
