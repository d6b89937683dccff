//! Configuration management for Tessera.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{Result, TesseraError};
use crate::core::types::StorageType;
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Tantivy refuses writer budgets below this many MB per thread
pub const MIN_HEAP_MB_PER_THREAD: usize = 15;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub writer: WriterConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for index data and metadata
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Backend used when an index is created without one
    #[serde(default)]
    pub default_storage_type: StorageType,
}

/// Index writer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WriterConfig {
    /// Memory budget per index writer, in MB
    #[serde(default = "default_heap_size_mb")]
    pub heap_size_mb: usize,

    /// Indexing threads per writer (0 = let Tantivy decide)
    #[serde(default)]
    pub num_threads: usize,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_heap_size_mb() -> usize {
    50
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_storage_type: StorageType::default(),
        }
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            heap_size_mb: default_heap_size_mb(),
            num_threads: 0,
        }
    }
}

impl WriterConfig {
    pub fn heap_size_bytes(&self) -> usize {
        self.heap_size_mb.saturating_mul(1_000_000)
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| TesseraError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. TESSERA_CONFIG env var
    /// 2. XDG config file (~/.config/tessera/config.toml)
    /// 3. ./tessera.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("TESSERA_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("tessera.toml").exists() {
                Self::from_file("tessera.toml")?
            } else {
                Self::default()
            }
        };

        // Fall back to the XDG data directory unless one was chosen explicitly
        if env::var("TESSERA_DATA_DIR").is_err() && config.storage.data_dir == default_data_dir()
        {
            config.storage.data_dir = xdg.data_dir.clone();
        }

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(data_dir) = env::var("TESSERA_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(storage_type) = env::var("TESSERA_STORAGE_TYPE") {
            self.storage.default_storage_type = storage_type.parse()?;
        }

        if let Ok(heap) = env::var("TESSERA_WRITER_HEAP_MB") {
            if let Ok(mb) = heap.parse() {
                self.writer.heap_size_mb = mb;
            }
        }
        if let Ok(threads) = env::var("TESSERA_WRITER_THREADS") {
            if let Ok(n) = threads.parse() {
                self.writer.num_threads = n;
            }
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(TesseraError::ConfigError(
                "Data directory must not be empty".to_string(),
            ));
        }

        let threads = self.writer.num_threads.max(1);
        if self.writer.heap_size_mb < MIN_HEAP_MB_PER_THREAD.saturating_mul(threads) {
            return Err(TesseraError::ConfigError(format!(
                "Writer heap of {} MB is below {} MB per thread ({} threads)",
                self.writer.heap_size_mb, MIN_HEAP_MB_PER_THREAD, threads
            )));
        }

        Ok(())
    }

    /// Directory holding one subdirectory per index
    pub fn indexes_dir(&self) -> PathBuf {
        self.storage.data_dir.join("indexes")
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Data dir: {:?}", self.storage.data_dir);
        tracing::info!(
            "  Default storage type: {}",
            self.storage.default_storage_type
        );
        tracing::info!("  Writer heap: {} MB", self.writer.heap_size_mb);
        tracing::info!("  Writer threads: {}", self.writer.num_threads);
    }
}
