//! Core domain logic
//!
//! Everything needed to restore, register and lazily open indexes,
//! independent of how it is driven (CLI, embedding service, tests).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Storage types, name validation, summaries
//! - **xdg**: XDG directory handling
//! - **analysis**: Analyzer pipelines built from stored configuration
//! - **metadata**: Persisted index definitions and their stores
//! - **storage**: Writer/reader handles and the Tantivy backend
//! - **index**: The index entity and its lazy writer
//! - **registry**: Name-keyed map of live indexes
//! - **loader**: Startup restoration from the metadata store
//! - **services**: Unified service container

pub mod analysis;
pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod metadata;
pub mod registry;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{Result, TesseraError};
pub use index::Index;
pub use registry::IndexRegistry;
pub use services::Services;
