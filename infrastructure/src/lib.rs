//! Infrastructure layer for fncall-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: generation engines, the attempt log,
//! tool catalog loading and configuration file loading.

pub mod catalog;
pub mod config;
pub mod engines;
pub mod logging;

// Re-export commonly used types
pub use catalog::{CatalogError, load_catalog, parse_catalog};
pub use config::{ConfigLoader, FileConfig, FileOutputConfig};
#[cfg(feature = "cloud")]
pub use engines::{GeminiConfig, GeminiEngine};
pub use engines::{ProcessEngine, ProcessEngineConfig, UnconfiguredEngine};
pub use logging::JsonlAttemptLogger;
