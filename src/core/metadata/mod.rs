//! Persisted index definitions and the stores that hold them.
//!
//! A [`MetadataStore`] is the durable source of truth for which
//! indexes exist and how they are configured. The in-memory registry
//! is rebuilt from it at startup; statistics flow back into it when an
//! index is synced.
//!
//! # Implementations
//!
//! - **FileMetadataStore**: one `meta.json` per index directory
//! - **MemoryMetadataStore**: process-local, for tests and ephemeral use

mod file;
mod memory;

pub use file::FileMetadataStore;
pub use memory::MemoryMetadataStore;

use crate::core::analysis::AnalysisConfig;
use crate::core::error::Result;
use crate::core::types::StorageType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Durable store of index definitions
pub trait MetadataStore: Send + Sync {
    /// List definitions ordered by name. `limit == 0` means no limit.
    fn list(&self, offset: usize, limit: usize) -> Result<Vec<IndexDefinition>>;

    /// Fetch a single definition
    fn get(&self, name: &str) -> Result<Option<IndexDefinition>>;

    /// Insert or replace a definition
    fn put(&self, definition: &IndexDefinition) -> Result<()>;

    /// Remove a definition. Fails with `IndexNotFound` if absent.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Apply `offset`/`limit` paging to an already ordered list
pub(crate) fn paginate(
    definitions: impl IntoIterator<Item = IndexDefinition>,
    offset: usize,
    limit: usize,
) -> Vec<IndexDefinition> {
    let limit = if limit == 0 { usize::MAX } else { limit };
    definitions.into_iter().skip(offset).take(limit).collect()
}

/// Persisted form of an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,

    #[serde(default)]
    pub storage_type: StorageType,

    #[serde(default)]
    pub docs_count: u64,

    #[serde(default)]
    pub storage_size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<IndexSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Mappings>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            storage_type,
            docs_count: 0,
            storage_size: 0,
            settings: None,
            mappings: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_settings(mut self, settings: IndexSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_mappings(mut self, mappings: Mappings) -> Self {
        self.mappings = Some(mappings);
        self
    }
}

/// Index-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_shards: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_replicas: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisConfig>,
}

impl IndexSettings {
    /// The analysis section, if present and non-empty
    pub fn analysis(&self) -> Option<&AnalysisConfig> {
        self.analysis.as_ref().filter(|a| !a.is_empty())
    }
}

/// Field-type schema of an index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
}

impl Mappings {
    pub fn with_property(mut self, field: impl Into<String>, property: Property) -> Self {
        self.properties.insert(field.into(), property);
        self
    }

    /// Analyzer names referenced by any property
    pub fn referenced_analyzers(&self) -> impl Iterator<Item = &str> {
        self.properties.values().flat_map(|p| {
            p.analyzer
                .as_deref()
                .into_iter()
                .chain(p.search_analyzer.as_deref())
        })
    }
}

/// Field data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Text,
    Keyword,
    #[serde(alias = "long", alias = "integer", alias = "float", alias = "double")]
    Numeric,
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "datetime")]
    Date,
}

/// Mapping of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: PropertyType,

    #[serde(default = "default_true")]
    pub index: bool,

    #[serde(default)]
    pub store: bool,

    #[serde(default)]
    pub sortable: bool,

    #[serde(default)]
    pub aggregatable: bool,

    #[serde(default)]
    pub highlightable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_analyzer: Option<String>,

    /// Date format for `date` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Property {
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            index: true,
            store: false,
            sortable: false,
            aggregatable: false,
            highlightable: false,
            analyzer: None,
            search_analyzer: None,
            format: None,
        }
    }

    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }
}
