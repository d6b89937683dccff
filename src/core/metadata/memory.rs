//! In-process metadata store.

use super::{paginate, IndexDefinition, MetadataStore};
use crate::core::error::{Result, TesseraError};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Metadata store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    definitions: RwLock<BTreeMap<String, IndexDefinition>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing definitions
    pub fn with_definitions(definitions: impl IntoIterator<Item = IndexDefinition>) -> Self {
        let map = definitions
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        Self {
            definitions: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn list(&self, offset: usize, limit: usize) -> Result<Vec<IndexDefinition>> {
        let definitions = self.definitions.read();
        Ok(paginate(definitions.values().cloned(), offset, limit))
    }

    fn get(&self, name: &str) -> Result<Option<IndexDefinition>> {
        Ok(self.definitions.read().get(name).cloned())
    }

    fn put(&self, definition: &IndexDefinition) -> Result<()> {
        self.definitions
            .write()
            .insert(definition.name.clone(), definition.clone());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.definitions
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TesseraError::IndexNotFound(name.to_string()))
    }
}
