//! Quorum settings: how each intent is voted on.

use fncall_domain::{DomainError, QuorumRule};
use serde::{Deserialize, Serialize};

/// Voting parameters for the hybrid mode.
///
/// # Example
///
/// ```
/// use fncall_application::config::QuorumSettings;
///
/// let settings = QuorumSettings::default();
/// assert_eq!(settings.attempts, 3);
/// assert_eq!(settings.threshold().unwrap(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumSettings {
    /// Identical attempts dispatched per intent
    pub attempts: usize,
    pub rule: QuorumRule,
    /// Engine calls allowed in flight at once, across all intents
    pub workers: usize,
    /// Resolve intents concurrently instead of one after another
    pub concurrent_intents: bool,
}

impl Default for QuorumSettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            rule: QuorumRule::Majority,
            workers: 3,
            concurrent_intents: false,
        }
    }
}

impl QuorumSettings {
    /// Identical answers needed to settle an intent.
    pub fn threshold(&self) -> Result<usize, DomainError> {
        self.rule.checked_threshold(self.attempts)
    }

    // ==================== Builder Methods ====================

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_rule(mut self, rule: QuorumRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_concurrent_intents(mut self, concurrent: bool) -> Self {
        self.concurrent_intents = concurrent;
        self
    }
}
