//! In-memory index entity.
//!
//! An [`Index`] owns one logical index: its identity, settings, mappings,
//! constructed analyzers, summary statistics and the single live writer
//! handle. Every mutable field sits behind one `RwLock`.
//!
//! # Writer lifecycle
//!
//! The writer is opened lazily on the first [`Index::get_writer`] call.
//! Callers that find a cached handle return it under the shared lock
//! without any I/O. A miss takes the per-index open mutex, re-checks the
//! cache, and only then asks the [`WriterOpener`]. The state lock is not
//! held during the open; it is taken exclusively just to store the new
//! handle, so statistics stay readable while the engine opens. Concurrent
//! first-time callers queue on the open mutex and open the engine exactly
//! once. A failed open caches nothing, so the next call tries again.

use crate::core::analysis::{
    build_analyzers, Analyzers, AnalysisConfig, BUILTIN_ANALYZERS, DEFAULT_ANALYZER,
};
use crate::core::error::{Result, TesseraError};
use crate::core::metadata::{IndexDefinition, IndexSettings, Mappings};
use crate::core::storage::{ReaderHandle, WriterHandle, WriterOpener};
use crate::core::types::{IndexSummary, StorageType};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// One logical index
pub struct Index {
    name: String,
    storage_type: StorageType,
    opener: Arc<dyn WriterOpener>,
    state: RwLock<IndexState>,
    /// Serializes writer opens and anything that must not race one
    open_lock: Mutex<()>,
}

struct IndexState {
    settings: Option<IndexSettings>,
    mappings: Option<Mappings>,
    analyzers: Analyzers,
    docs_count: u64,
    storage_size: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    writer: Option<Arc<dyn WriterHandle>>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("storage_type", &self.storage_type)
            .field("docs_count", &state.docs_count)
            .field("storage_size", &state.storage_size)
            .field("writer_open", &state.writer.is_some())
            .finish()
    }
}

impl Index {
    /// Create an empty index with no settings or mappings
    pub fn new(name: impl Into<String>, storage_type: StorageType, opener: Arc<dyn WriterOpener>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            storage_type,
            opener,
            state: RwLock::new(IndexState {
                settings: None,
                mappings: None,
                analyzers: Analyzers::new(),
                docs_count: 0,
                storage_size: 0,
                created_at: now,
                updated_at: now,
                writer: None,
            }),
            open_lock: Mutex::new(()),
        }
    }

    /// Rebuild an index from its persisted definition.
    ///
    /// Builds the analyzers of a non-empty analysis section and fails with
    /// `InvalidAnalysis` when they don't build. No writer is opened.
    pub fn from_definition(definition: IndexDefinition, opener: Arc<dyn WriterOpener>) -> Result<Self> {
        let analyzers = match definition.settings.as_ref().and_then(IndexSettings::analysis) {
            Some(analysis) => build_analyzers(analysis)?,
            None => Analyzers::new(),
        };

        Ok(Self {
            name: definition.name,
            storage_type: definition.storage_type,
            opener,
            state: RwLock::new(IndexState {
                settings: definition.settings,
                mappings: definition.mappings,
                analyzers,
                docs_count: definition.docs_count,
                storage_size: definition.storage_size,
                created_at: definition.created_at,
                updated_at: definition.updated_at,
                writer: None,
            }),
            open_lock: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn docs_count(&self) -> u64 {
        self.state.read().docs_count
    }

    pub fn storage_size(&self) -> u64 {
        self.state.read().storage_size
    }

    pub fn settings(&self) -> Option<IndexSettings> {
        self.state.read().settings.clone()
    }

    pub fn mappings(&self) -> Option<Mappings> {
        self.state.read().mappings.clone()
    }

    /// Names of the constructed analyzers, sorted
    pub fn analyzer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().analyzers.keys().cloned().collect();
        names.sort();
        names
    }

    /// A clone of the named analyzer, if this index declares it
    pub fn analyzer(&self, name: &str) -> Option<tantivy::tokenizer::TextAnalyzer> {
        self.state.read().analyzers.get(name).cloned()
    }

    /// True once a writer has been opened and not closed
    pub fn has_writer(&self) -> bool {
        self.state.read().writer.is_some()
    }

    /// Return the index writer, opening it on first use
    pub fn get_writer(&self) -> Result<Arc<dyn WriterHandle>> {
        if let Some(writer) = self.state.read().writer.clone() {
            return Ok(writer);
        }

        let (writer, opened) = self.open_writer()?;
        if opened {
            self.update_metadata();
        }
        Ok(writer)
    }

    /// Open the writer unless another caller stored one first.
    /// The flag is true when this call opened it.
    fn open_writer(&self) -> Result<(Arc<dyn WriterHandle>, bool)> {
        let _open = self.open_lock.lock();

        let default_analyzer = {
            let state = self.state.read();
            if let Some(writer) = &state.writer {
                return Ok((Arc::clone(writer), false));
            }
            state.analyzers.get(DEFAULT_ANALYZER).cloned()
        };

        let writer = self.opener.open(
            &self.name,
            self.storage_type,
            default_analyzer.as_ref(),
            0,
            0,
        )?;
        self.state.write().writer = Some(Arc::clone(&writer));

        tracing::debug!("Opened writer [{}:{}]", self.name, self.storage_type);
        Ok((writer, true))
    }

    /// Reader snapshot derived from the writer
    pub fn get_reader(&self) -> Result<Box<dyn ReaderHandle>> {
        let writer = self.get_writer()?;
        writer.reader()
    }

    /// Refresh `docs_count` and `storage_size` from the open writer.
    ///
    /// Best effort: does nothing without a writer, and a failed reader or
    /// count leaves the previous document count in place.
    pub fn update_metadata(&self) {
        let writer = match self.state.read().writer.clone() {
            Some(writer) => writer,
            None => return,
        };

        let docs_count = match writer.reader().and_then(|reader| reader.count()) {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::debug!("Skipping document count refresh for {}: {}", self.name, e);
                None
            }
        };
        let status = writer.status();

        let mut state = self.state.write();
        if let Some(count) = docs_count {
            state.docs_count = count;
        }
        state.storage_size = status.on_disk_bytes;
    }

    /// Replace the settings wholesale and rebuild the analyzers.
    ///
    /// Changing the analysis section is refused while a writer is open,
    /// since the writer was built with the old default analyzer.
    pub fn set_settings(&self, settings: IndexSettings) -> Result<()> {
        let analyzers = match settings.analysis() {
            Some(analysis) => build_analyzers(analysis)?,
            None => Analyzers::new(),
        };

        // An in-flight open was handed the current default analyzer
        let _open = self.open_lock.lock();
        let mut state = self.state.write();
        let current = state.settings.as_ref().and_then(IndexSettings::analysis);
        if state.writer.is_some() && current != settings.analysis() {
            return Err(TesseraError::InvalidAnalysis(format!(
                "cannot change analysis of index '{}' while its writer is open",
                self.name
            )));
        }

        if let Some(mappings) = &state.mappings {
            check_analyzer_references(mappings, &analyzers)?;
        }

        state.settings = Some(settings);
        state.analyzers = analyzers;
        state.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the mappings wholesale.
    ///
    /// Every analyzer a property names must be declared by the index or
    /// be a built-in analyzer type.
    pub fn set_mappings(&self, mappings: Mappings) -> Result<()> {
        let mut state = self.state.write();
        check_analyzer_references(&mappings, &state.analyzers)?;
        state.mappings = Some(mappings);
        state.updated_at = Utc::now();
        Ok(())
    }

    /// Analysis section currently in effect
    pub fn analysis(&self) -> Option<AnalysisConfig> {
        self.state
            .read()
            .settings
            .as_ref()
            .and_then(IndexSettings::analysis)
            .cloned()
    }

    /// Snapshot of the index in its persisted form
    pub fn definition(&self) -> IndexDefinition {
        let state = self.state.read();
        IndexDefinition {
            name: self.name.clone(),
            storage_type: self.storage_type,
            docs_count: state.docs_count,
            storage_size: state.storage_size,
            settings: state.settings.clone(),
            mappings: state.mappings.clone(),
            created_at: state.created_at,
            updated_at: state.updated_at,
        }
    }

    pub fn summary(&self) -> IndexSummary {
        let state = self.state.read();
        let mut analyzers: Vec<String> = state.analyzers.keys().cloned().collect();
        analyzers.sort();
        IndexSummary {
            name: self.name.clone(),
            storage_type: self.storage_type,
            docs_count: state.docs_count,
            storage_size: state.storage_size,
            analyzers,
            writer_open: state.writer.is_some(),
        }
    }

    /// Commit and release the writer. A later `get_writer` reopens it.
    pub fn close(&self) -> Result<()> {
        let writer = {
            let _open = self.open_lock.lock();
            self.state.write().writer.take()
        };
        match writer {
            Some(writer) => {
                tracing::debug!("Closing writer [{}:{}]", self.name, self.storage_type);
                writer.close()
            }
            None => Ok(()),
        }
    }

    /// Remove the physical storage through the opener
    pub(crate) fn destroy_storage(&self) -> Result<()> {
        self.opener.destroy(&self.name, self.storage_type)
    }
}

fn check_analyzer_references(mappings: &Mappings, analyzers: &Analyzers) -> Result<()> {
    for name in mappings.referenced_analyzers() {
        if !analyzers.contains_key(name) && !BUILTIN_ANALYZERS.contains(&name) {
            return Err(TesseraError::InvalidAnalysis(format!(
                "mapping references unknown analyzer '{name}'"
            )));
        }
    }
    Ok(())
}
