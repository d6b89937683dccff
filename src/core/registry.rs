//! Name-keyed registry of live indexes.
//!
//! The registry hands out shared `Arc<Index>` references, so every holder
//! observes the same writer and statistics. It is an ordinary owned value:
//! the service container holds one, tests build their own.

use crate::core::error::Result;
use crate::core::index::Index;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct IndexRegistry {
    indexes: DashMap<String, Arc<Index>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index, replacing any entry with the same name.
    /// Returns the replaced entry.
    pub fn add(&self, index: Arc<Index>) -> Option<Arc<Index>> {
        self.indexes.insert(index.name().to_string(), index)
    }

    /// Register an index only if its name is free.
    /// Returns false, leaving the registry unchanged, when it is taken.
    pub fn try_add(&self, index: Arc<Index>) -> bool {
        match self.indexes.entry(index.name().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(index);
                true
            }
        }
    }

    /// Drop the entry for `index`'s name if it is still `index` itself.
    /// The writer is left alone.
    pub fn discard(&self, index: &Arc<Index>) -> bool {
        self.indexes
            .remove_if(index.name(), |_, current| Arc::ptr_eq(current, index))
            .is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Index>> {
        self.indexes.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Unregister an index and release its writer.
    ///
    /// The entry is gone even if closing the writer fails; the error is
    /// returned alongside so the caller can report it.
    pub fn remove(&self, name: &str) -> Option<(Arc<Index>, Result<()>)> {
        let (_, index) = self.indexes.remove(name)?;
        let closed = index.close();
        Some((index, closed))
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// All registered indexes, sorted by name
    pub fn list(&self) -> Vec<Arc<Index>> {
        let mut indexes: Vec<Arc<Index>> =
            self.indexes.iter().map(|e| Arc::clone(e.value())).collect();
        indexes.sort_by(|a, b| a.name().cmp(b.name()));
        indexes
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Close every open writer, keeping the entries registered.
    /// Returns the number of failures, each logged.
    pub fn close_all(&self) -> usize {
        let mut failures = 0;
        for index in self.list() {
            if let Err(e) = index.close() {
                tracing::warn!("Failed to close index {}: {}", index.name(), e);
                failures += 1;
            }
        }
        failures
    }
}
