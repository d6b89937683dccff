//! Unified service container for Tessera
//!
//! Provides shared access to the configuration, the metadata store,
//! the index registry and the writer opener, and implements the index
//! lifecycle on top of them.

use crate::core::config::Config;
use crate::core::error::{Result, TesseraError};
use crate::core::index::Index;
use crate::core::loader;
use crate::core::metadata::{FileMetadataStore, IndexDefinition, IndexSettings, Mappings, MetadataStore};
use crate::core::registry::IndexRegistry;
use crate::core::storage::{TantivyWriterOpener, WriterOpener};
use crate::core::types::{validate_index_name, StorageType};
use std::sync::Arc;

/// Unified services container
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,

    /// Durable index definitions
    pub metadata: Arc<dyn MetadataStore>,

    /// Live indexes by name
    pub registry: Arc<IndexRegistry>,

    /// Backend used to open index writers
    pub opener: Arc<dyn WriterOpener>,
}

impl Services {
    /// Create services from configuration, backed by `meta.json` files and
    /// Tantivy under the configured data directory
    pub fn new(config: Config) -> Self {
        let metadata = Arc::new(FileMetadataStore::new(config.indexes_dir()));
        let opener = Arc::new(TantivyWriterOpener::from_config(&config));
        Self::with_components(config, metadata, opener)
    }

    /// Create services from explicit collaborators and an empty registry
    pub fn with_components(
        config: Config,
        metadata: Arc<dyn MetadataStore>,
        opener: Arc<dyn WriterOpener>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metadata,
            registry: Arc::new(IndexRegistry::new()),
            opener,
        }
    }

    /// Restore all persisted indexes into the registry
    pub fn load_indexes(&self) -> Result<usize> {
        let loaded = loader::load_all(self.metadata.as_ref(), &self.opener, &self.registry)?;
        tracing::info!("Loaded {} index(es)", loaded);
        Ok(loaded)
    }

    /// Create, persist and register a new index.
    ///
    /// Uses the configured default storage type when none is given. The
    /// name is reserved in the registry before anything is persisted, so
    /// of two concurrent creates with one name exactly one succeeds.
    pub fn create_index(
        &self,
        name: &str,
        storage_type: Option<StorageType>,
        settings: Option<IndexSettings>,
        mappings: Option<Mappings>,
    ) -> Result<Arc<Index>> {
        validate_index_name(name)?;

        let storage_type = storage_type.unwrap_or(self.config.storage.default_storage_type);
        let index = Index::new(name, storage_type, Arc::clone(&self.opener));
        if let Some(settings) = settings {
            index.set_settings(settings)?;
        }
        if let Some(mappings) = mappings {
            index.set_mappings(mappings)?;
        }

        let index = Arc::new(index);
        if !self.registry.try_add(Arc::clone(&index)) {
            return Err(TesseraError::IndexAlreadyExists(name.to_string()));
        }

        let persisted = match self.metadata.get(name) {
            Ok(Some(_)) => Err(TesseraError::IndexAlreadyExists(name.to_string())),
            Ok(None) => self.metadata.put(&index.definition()),
            Err(e) => Err(e),
        };
        if let Err(e) = persisted {
            self.registry.discard(&index);
            return Err(e);
        }

        tracing::info!("Created index [{}:{}]", name, storage_type);
        Ok(index)
    }

    /// Look up a live index
    pub fn get_index(&self, name: &str) -> Result<Arc<Index>> {
        self.registry
            .get(name)
            .ok_or_else(|| TesseraError::IndexNotFound(name.to_string()))
    }

    /// Unregister an index, close its writer, remove its storage and
    /// its definition.
    ///
    /// If storage or definition removal fails the index is registered
    /// again, so the registry keeps matching the store.
    pub fn delete_index(&self, name: &str) -> Result<()> {
        let (index, closed) = self
            .registry
            .remove(name)
            .ok_or_else(|| TesseraError::IndexNotFound(name.to_string()))?;
        if let Err(e) = closed {
            tracing::warn!("Failed to close writer of {}: {}", name, e);
        }

        let removed = index.destroy_storage().and_then(|()| match self.metadata.delete(name) {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        });
        if let Err(e) = removed {
            tracing::warn!("Failed to delete index {}, keeping it registered: {}", name, e);
            self.registry.try_add(index);
            return Err(e);
        }

        tracing::info!("Deleted index [{}:{}]", name, index.storage_type());
        Ok(())
    }

    /// Replace an index's settings and persist the result
    pub fn update_settings(&self, name: &str, settings: IndexSettings) -> Result<IndexDefinition> {
        let index = self.get_index(name)?;
        index.set_settings(settings)?;
        let definition = index.definition();
        self.metadata.put(&definition)?;
        Ok(definition)
    }

    /// Replace an index's mappings and persist the result
    pub fn update_mappings(&self, name: &str, mappings: Mappings) -> Result<IndexDefinition> {
        let index = self.get_index(name)?;
        index.set_mappings(mappings)?;
        let definition = index.definition();
        self.metadata.put(&definition)?;
        Ok(definition)
    }

    /// Refresh an index's statistics and persist its definition
    pub fn sync_index(&self, name: &str) -> Result<IndexDefinition> {
        let index = self.get_index(name)?;
        index.update_metadata();
        let definition = index.definition();
        self.metadata.put(&definition)?;
        Ok(definition)
    }

    /// Sync every registered index, stopping at the first store error
    pub fn sync_all(&self) -> Result<usize> {
        let indexes = self.registry.list();
        for index in &indexes {
            index.update_metadata();
            self.metadata.put(&index.definition())?;
        }
        Ok(indexes.len())
    }

    /// Persist final statistics and close every writer.
    ///
    /// Writers are closed even when syncing fails; both outcomes are
    /// reported.
    pub fn shutdown(&self) -> Result<()> {
        let synced = self.sync_all();
        let failures = self.registry.close_all();
        let closed = format!("{failures} writer(s) failed to close");

        match synced {
            Ok(_) if failures == 0 => Ok(()),
            Ok(_) => Err(TesseraError::StorageError(closed)),
            Err(e) if failures == 0 => Err(e),
            Err(e) => Err(TesseraError::runtime(closed, e)),
        }
    }
}
