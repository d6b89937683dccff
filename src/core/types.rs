//! Core data types for Tessera.
//!
//! Storage backend selection, index name validation, and the
//! summary structures reported to adapters.

use crate::core::error::{Result, TesseraError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index names: alphanumeric first, then alphanumerics, `_`, `-` or `.`
static INDEX_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").unwrap());

/// Maximum index name length in bytes
pub const MAX_INDEX_NAME_LEN: usize = 255;

/// Physical backend an index writer is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageType {
    /// Memory-mapped segment files under the data directory
    #[default]
    #[serde(rename = "disk")]
    Disk,

    /// RAM-only index, lost on process exit
    #[serde(rename = "memory")]
    Memory,

    /// S3-compatible object storage
    #[serde(rename = "s3")]
    ObjectStore,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Disk => "disk",
            StorageType::Memory => "memory",
            StorageType::ObjectStore => "s3",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" | "local" => Ok(StorageType::Disk),
            "memory" | "ram" => Ok(StorageType::Memory),
            "s3" | "minio" | "object-store" => Ok(StorageType::ObjectStore),
            other => Err(TesseraError::ConfigError(format!(
                "Unknown storage type '{other}' (expected disk, memory or s3)"
            ))),
        }
    }
}

/// Validate an index name before it is used as a key or a directory name
pub fn validate_index_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TesseraError::InvalidIndex(
            "Index name must not be empty".to_string(),
        ));
    }

    if name.len() > MAX_INDEX_NAME_LEN {
        return Err(TesseraError::InvalidIndex(format!(
            "Index name exceeds {MAX_INDEX_NAME_LEN} bytes"
        )));
    }

    if !INDEX_NAME_PATTERN.is_match(name) {
        return Err(TesseraError::InvalidIndex(format!(
            "Index name '{name}' must start with a letter or digit and contain only \
             letters, digits, '_', '-' or '.'"
        )));
    }

    Ok(())
}

/// Point-in-time summary of an index, as shown to adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    pub name: String,
    pub storage_type: StorageType,
    pub docs_count: u64,
    pub storage_size: u64,
    pub analyzers: Vec<String>,
    pub writer_open: bool,
}
