//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod engine;
mod generation;
mod logging;
mod output;
mod quorum;

pub use engine::{FileCloudEngineConfig, FileEngineConfig, FileLocalEngineConfig};
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use quorum::FileQuorumConfig;

use fncall_domain::{ConfigIssue, ConfigIssueCode, SegmenterConfig};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Voting settings
    pub quorum: FileQuorumConfig,
    /// Intent splitting and tool narrowing
    pub segmenter: SegmenterConfig,
    /// Mode, fallback and engine-call limits
    pub generation: FileGenerationConfig,
    /// On-device and cloud engines
    pub engine: FileEngineConfig,
    /// Output settings
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Quorum counts, rule syntax and reachability
    /// 2. Mode and fallback enum values
    /// 3. Segmenter settings
    /// 4. Cloud fallback without a usable cloud key
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.quorum.validate());
        issues.extend(self.generation.validate());

        if self.segmenter.top_k == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroCount {
                    field: "segmenter.top_k".to_string(),
                },
                "segmenter.top_k must be at least 1; intents would have no tools",
            ));
        }

        let (fallback, _) = self.generation.parse_cloud_fallback();
        if fallback.is_enabled() && self.engine.cloud.resolve_api_key().is_none() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::FallbackWithoutCloud,
                format!(
                    "generation.cloud_fallback is '{}' but no cloud API key is set (${})",
                    fallback, self.engine.cloud.api_key_env
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fncall_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[quorum]
attempts = 5
rule = "unanimous"

[segmenter]
top_k = 3
split_words = ["and", "then", "also"]

[generation]
mode = "cloud"

[output]
format = "full"
color = false

[logging]
attempt_log = "attempts.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quorum.attempts, 5);
        assert_eq!(config.segmenter.top_k, 3);
        assert_eq!(config.segmenter.split_words, ["and", "then", "also"]);
        assert!(config.segmenter.split_on_commas);
        assert_eq!(config.generation.mode, "cloud");
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert_eq!(
            config.logging.attempt_log.as_deref(),
            Some(std::path::Path::new("attempts.jsonl"))
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[quorum]
workers = 8
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quorum.workers, 8);
        // Defaults should apply
        assert_eq!(config.quorum.attempts, 3);
        assert_eq!(config.segmenter, SegmenterConfig::default());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = FileConfig::default();
        config.segmenter.top_k = 0;
        let issues = config.validate();
        assert!(ConfigIssue::has_errors(&issues));
    }

    #[test]
    fn test_validate_fallback_without_key() {
        let mut config = FileConfig::default();
        config.generation.cloud_fallback = "on_no_quorum".to_string();
        config.engine.cloud.api_key_env = "FNCALL_TEST_SURELY_UNSET_KEY".to_string();

        let issues = config.validate();
        assert!(!ConfigIssue::has_errors(&issues));
        assert!(issues.iter().any(|i| i.code == ConfigIssueCode::FallbackWithoutCloud));
    }
}
