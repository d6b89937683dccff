//! File-backed metadata store.
//!
//! Each index owns a directory under the store root holding its
//! definition as pretty-printed JSON:
//!
//! ```text
//! {data_dir}/indexes/
//! ├── {index-1}/
//! │   ├── meta.json           # Index definition
//! │   └── tantivy/            # Segment files (disk storage only)
//! ```

use super::{paginate, IndexDefinition, MetadataStore};
use crate::core::error::{Result, TesseraError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const METADATA_FILE: &str = "meta.json";

/// Metadata store writing one `meta.json` per index directory
#[derive(Debug, Clone)]
pub struct FileMetadataStore {
    /// Root directory holding one subdirectory per index
    root: PathBuf,
}

impl FileMetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn metadata_path(&self, name: &str) -> PathBuf {
        self.index_dir(name).join(METADATA_FILE)
    }

    fn read_definition(&self, path: &Path) -> Result<IndexDefinition> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            TesseraError::MetadataError(format!("Corrupt definition {}: {e}", path.display()))
        })
    }
}

impl MetadataStore for FileMetadataStore {
    fn list(&self, offset: usize, limit: usize) -> Result<Vec<IndexDefinition>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if entry.path().join(METADATA_FILE).is_file() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let definitions = names
            .iter()
            .map(|name| self.read_definition(&self.metadata_path(name)))
            .collect::<Result<Vec<_>>>()?;

        Ok(paginate(definitions, offset, limit))
    }

    fn get(&self, name: &str) -> Result<Option<IndexDefinition>> {
        let path = self.metadata_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        self.read_definition(&path).map(Some)
    }

    fn put(&self, definition: &IndexDefinition) -> Result<()> {
        let dir = self.index_dir(&definition.name);
        fs::create_dir_all(&dir)?;

        // Write then rename so readers never see a torn file
        let json = serde_json::to_string_pretty(definition)?;
        let tmp_path = dir.join(format!("{METADATA_FILE}.tmp"));
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, self.metadata_path(&definition.name))?;

        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.metadata_path(name)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TesseraError::IndexNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        // Only succeeds once the storage backend has removed its files too
        let _ = fs::remove_dir(self.index_dir(name));
        Ok(())
    }
}
