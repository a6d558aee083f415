//! Engine configuration from TOML (`[engine.local]` / `[engine.cloud]`)
//!
//! ```toml
//! [engine.local]
//! command = "fncall-runtime"
//! args = ["--model", "weights/functiongemma-270m-it"]
//!
//! [engine.cloud]
//! model = "gemini-2.5-flash"
//! api_key_env = "GEMINI_API_KEY"
//! ```

use crate::engines::ProcessEngineConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    pub local: FileLocalEngineConfig,
    pub cloud: FileCloudEngineConfig,
}

/// On-device runtime invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLocalEngineConfig {
    /// Executable run once per attempt
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Extra environment for the child process
    pub env: HashMap<String, String>,
}

impl FileLocalEngineConfig {
    pub fn to_process_config(&self) -> Option<ProcessEngineConfig> {
        let command = self.command.as_deref().filter(|c| !c.trim().is_empty())?;
        Some(
            ProcessEngineConfig::new(command)
                .with_args(self.args.clone())
                .with_env(self.env.clone()),
        )
    }
}

/// Cloud API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCloudEngineConfig {
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key; prefer `api_key_env`
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for FileCloudEngineConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl FileCloudEngineConfig {
    /// The direct key if set, otherwise the named environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    #[cfg(feature = "cloud")]
    pub fn to_gemini_config(&self) -> Option<crate::engines::GeminiConfig> {
        let key = self.resolve_api_key()?;
        Some(
            crate::engines::GeminiConfig::new(key)
                .with_model(self.model.clone())
                .with_base_url(self.base_url.clone())
                .with_timeout(self.timeout()),
        )
    }
}
