//! Startup restoration of indexes from the metadata store.

use crate::core::error::{Result, TesseraError};
use crate::core::index::Index;
use crate::core::metadata::MetadataStore;
use crate::core::registry::IndexRegistry;
use crate::core::storage::WriterOpener;
use std::sync::Arc;

/// Rebuild every persisted index and register it.
///
/// All definitions are turned into indexes before any is registered, so a
/// definition whose stored analysis no longer builds aborts the load with
/// the registry untouched. Writers are not opened here.
///
/// Meant to run once at startup; a second call replaces entries by name.
pub fn load_all(
    store: &dyn MetadataStore,
    opener: &Arc<dyn WriterOpener>,
    registry: &IndexRegistry,
) -> Result<usize> {
    let definitions = store.list(0, 0)?;

    let mut indexes = Vec::with_capacity(definitions.len());
    for definition in definitions {
        tracing::info!(
            "Loading index... [{}:{}]",
            definition.name,
            definition.storage_type
        );
        let index = Index::from_definition(definition, Arc::clone(opener))
            .map_err(|e| TesseraError::runtime("parse stored analysis error", e))?;
        indexes.push(Arc::new(index));
    }

    let loaded = indexes.len();
    for index in indexes {
        registry.add(index);
    }

    Ok(loaded)
}
