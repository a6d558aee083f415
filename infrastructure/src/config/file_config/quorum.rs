//! Quorum configuration from TOML (`[quorum]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [quorum]
//! attempts = 5
//! rule = "atleast:3"          # or "majority", "unanimous", "60%"
//! workers = 4
//! attempt_timeout_ms = 8000
//! concurrent_intents = true
//! ```

use fncall_application::QuorumSettings;
use fncall_domain::{ConfigIssue, ConfigIssueCode, QuorumRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw quorum configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQuorumConfig {
    /// Attempts dispatched per intent
    pub attempts: usize,
    /// Agreement rule: "majority", "unanimous", "atleast:N", "N%"
    pub rule: String,
    /// Engine calls in flight at once
    pub workers: usize,
    /// Per-attempt limit; unset means no limit
    pub attempt_timeout_ms: Option<u64>,
    pub concurrent_intents: bool,
}

impl Default for FileQuorumConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            rule: "majority".to_string(),
            workers: 3,
            attempt_timeout_ms: None,
            concurrent_intents: false,
        }
    }
}

impl FileQuorumConfig {
    /// Parse the rule string, falling back to majority.
    pub fn parse_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.rule.parse::<QuorumRule>() {
            Ok(rule) => (rule, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "quorum.rule".to_string(),
                        value: self.rule.clone(),
                        valid_values: vec![
                            "majority".to_string(),
                            "unanimous".to_string(),
                            "atleast:N".to_string(),
                            "N%".to_string(),
                        ],
                    },
                    format!(
                        "quorum.rule: unknown value '{}', falling back to 'majority'",
                        self.rule
                    ),
                );
                (QuorumRule::default(), vec![issue])
            }
        }
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_ms.map(Duration::from_millis)
    }

    pub fn to_settings(&self) -> QuorumSettings {
        QuorumSettings::default()
            .with_attempts(self.attempts)
            .with_rule(self.parse_rule().0)
            .with_workers(self.workers)
            .with_concurrent_intents(self.concurrent_intents)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (rule, mut issues) = self.parse_rule();

        for (field, value) in [("quorum.attempts", self.attempts), ("quorum.workers", self.workers)] {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroCount {
                        field: field.to_string(),
                    },
                    format!("{} must be at least 1", field),
                ));
            }
        }

        if self.attempts > 0 {
            let threshold = rule.threshold(self.attempts);
            if threshold == 0 || threshold > self.attempts {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnreachableQuorum {
                        threshold,
                        attempts: self.attempts,
                    },
                    format!(
                        "quorum.rule '{}' needs {} agreeing answers but only {} attempt(s) are made",
                        self.rule, threshold, self.attempts
                    ),
                ));
            } else if threshold == 1 && self.attempts > 1 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::TrivialQuorum,
                    "quorum threshold is 1: the first completed attempt always wins",
                ));
            }
        }

        if self.attempt_timeout_ms == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroCount {
                    field: "quorum.attempt_timeout_ms".to_string(),
                },
                "quorum.attempt_timeout_ms must be positive; omit it for no limit",
            ));
        }

        issues
    }
}
