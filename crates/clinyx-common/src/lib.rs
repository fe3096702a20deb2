//! clinyx-common — Shared error type and run configuration used across all clinyx crates.

pub mod error;
pub mod config;

// Re-export commonly used types
pub use error::{ClinyxError, Result};
pub use config::{IngestConfig, InputConfig, OutputConfig, VocabularyConfig};
