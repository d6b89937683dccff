//! Storage layer: writer handles and the backends that open them.
//!
//! An index never talks to a search engine directly. It asks a
//! [`WriterOpener`] for a [`WriterHandle`] once, caches it, and derives
//! every reader from that handle.
//!
//! # Architecture
//!
//! - **WriterOpener**: opens (or creates) the engine-side index for a name
//!   and storage type
//! - **WriterHandle**: the single live writer of an index; documents go in
//!   through it and reader snapshots come out of it
//! - **ReaderHandle**: read-only snapshot used for counts
//! - **TantivyWriterOpener**: disk (mmap) and in-memory Tantivy backends

mod tantivy;

pub use self::tantivy::{create_schema, TantivyReader, TantivyWriter, TantivyWriterOpener};

use crate::core::error::Result;
use crate::core::types::StorageType;
use ::tantivy::tokenizer::TextAnalyzer;
use serde::Serialize;
use std::sync::Arc;

/// Snapshot of writer-side statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriterStatus {
    /// Bytes currently occupied on disk (0 for memory-only backends)
    pub on_disk_bytes: u64,

    /// Number of searchable segments
    pub num_segments: usize,
}

/// Live handle to the engine-side index
pub trait WriterHandle: Send + Sync {
    /// Fresh read-only snapshot reflecting the last commit
    fn reader(&self) -> Result<Box<dyn ReaderHandle>>;

    /// Current writer statistics
    fn status(&self) -> WriterStatus;

    /// Insert or replace the document with this id
    fn add_document(&self, id: &str, source: &serde_json::Value) -> Result<()>;

    /// Delete the document with this id, if present
    fn delete_document(&self, id: &str) -> Result<()>;

    /// Make pending changes durable and visible to new readers.
    /// Returns the engine's opstamp.
    fn commit(&self) -> Result<u64>;

    /// Commit and release the engine writer. Later writes fail.
    fn close(&self) -> Result<()>;
}

/// Read-only snapshot over a writer's committed state
pub trait ReaderHandle: Send + Sync {
    /// Number of live documents
    fn count(&self) -> Result<u64>;
}

/// Opens writer handles for indexes
pub trait WriterOpener: Send + Sync {
    /// Open or create the engine-side index `name` on `storage_type`.
    ///
    /// `default_analyzer` replaces the engine's own default when given.
    /// `time_min`/`time_max` bound a time-partitioned shard; 0 means
    /// unbounded and backends without partitioning ignore them.
    fn open(
        &self,
        name: &str,
        storage_type: StorageType,
        default_analyzer: Option<&TextAnalyzer>,
        time_min: i64,
        time_max: i64,
    ) -> Result<Arc<dyn WriterHandle>>;

    /// Remove the physical storage of a deleted index
    fn destroy(&self, _name: &str, _storage_type: StorageType) -> Result<()> {
        Ok(())
    }
}
