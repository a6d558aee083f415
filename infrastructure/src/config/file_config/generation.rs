//! Generation configuration from TOML (`[generation]` section)

use fncall_application::{DEFAULT_STOP_SEQUENCES, GenerationOptions};
use fncall_domain::{CloudFallback, ConfigIssue, ConfigIssueCode, GenerationMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw generation configuration
///
/// # Example
///
/// ```toml
/// [generation]
/// mode = "hybrid"             # or "on-device", "cloud"
/// cloud_fallback = "on_no_quorum"
/// max_tokens = 256
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub mode: String,
    /// "never", "on_no_quorum" or "on_empty"
    pub cloud_fallback: String,
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
    /// Replaces the built-in system prompt
    pub system_prompt: Option<String>,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::default().to_string(),
            cloud_fallback: CloudFallback::default().to_string(),
            max_tokens: 256,
            stop_sequences: DEFAULT_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
            system_prompt: None,
        }
    }
}

impl FileGenerationConfig {
    pub fn parse_mode(&self) -> (GenerationMode, Vec<ConfigIssue>) {
        match self.mode.parse::<GenerationMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "generation.mode".to_string(),
                        value: self.mode.clone(),
                        valid_values: vec![
                            "on-device".to_string(),
                            "cloud".to_string(),
                            "hybrid".to_string(),
                        ],
                    },
                    format!(
                        "generation.mode: unknown value '{}', falling back to 'hybrid'",
                        self.mode
                    ),
                );
                (GenerationMode::default(), vec![issue])
            }
        }
    }

    pub fn parse_cloud_fallback(&self) -> (CloudFallback, Vec<ConfigIssue>) {
        match self.cloud_fallback.parse::<CloudFallback>() {
            Ok(policy) => (policy, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "generation.cloud_fallback".to_string(),
                        value: self.cloud_fallback.clone(),
                        valid_values: vec![
                            "never".to_string(),
                            "on_no_quorum".to_string(),
                            "on_empty".to_string(),
                        ],
                    },
                    format!(
                        "generation.cloud_fallback: unknown value '{}', falling back to 'never'",
                        self.cloud_fallback
                    ),
                );
                (CloudFallback::default(), vec![issue])
            }
        }
    }

    /// Build engine-call options; the timeout comes from `[quorum]`.
    pub fn to_options(&self, attempt_timeout: Option<Duration>) -> GenerationOptions {
        let mut options = GenerationOptions::default()
            .with_max_tokens(self.max_tokens)
            .with_attempt_timeout(attempt_timeout);
        options.stop_sequences = self.stop_sequences.clone();
        if let Some(prompt) = &self.system_prompt {
            options = options.with_system_prompt(prompt.clone());
        }
        options
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_mode().1;
        issues.extend(self.parse_cloud_fallback().1);
        if self.max_tokens == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroCount {
                    field: "generation.max_tokens".to_string(),
                },
                "generation.max_tokens must be at least 1",
            ));
        }
        issues
    }
}
