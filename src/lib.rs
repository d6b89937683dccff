//! Tessera - index registry and writer lifecycle for full-text search
//!
//! Tessera keeps the in-memory side of a multi-tenant search service:
//! index definitions are restored from a metadata store at startup,
//! each index opens its Tantivy writer lazily on first use, and cheap
//! statistics (document count, on-disk size) flow back into the index
//! and its persisted definition.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - analysis (analyzer pipelines from stored settings)
//!   - metadata (index definitions, file and memory stores)
//!   - storage (writer opener, Tantivy backend)
//!   - index, registry, loader
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Key Features
//!
//! - Single writer per index, opened once even under concurrent first use
//! - All-or-nothing startup load
//! - Best-effort statistics refresh that never fails the caller
//! - Disk (mmap) and in-memory Tantivy backends

// Core domain logic
pub mod core;

// CLI adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{Result, TesseraError};
pub use core::index::Index;
pub use core::registry::IndexRegistry;
pub use core::services::Services;
pub use core::types::*;
