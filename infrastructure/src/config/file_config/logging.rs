//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one line per attempt and resolution
    pub attempt_log: Option<PathBuf>,
    /// Diagnostic log file, in addition to stderr
    pub log_file: Option<PathBuf>,
}
