//! Configuration file loading for fncall-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `FNCALL_*` environment variables (`FNCALL_QUORUM__ATTEMPTS=5`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./fncall.toml` or `./.fncall.toml`
//! 4. Global: `$XDG_CONFIG_HOME/fncall-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileCloudEngineConfig, FileConfig, FileEngineConfig, FileGenerationConfig,
    FileLocalEngineConfig, FileLoggingConfig, FileOutputConfig,
    FileQuorumConfig,
};
pub use loader::ConfigLoader;
