//! Generation options: per-call engine parameters.

use crate::ports::generation_engine::DEFAULT_STOP_SEQUENCES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// System turn prepended to conversations that carry none
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can use tools. \
Do not ask for clarification. Just do your best. Be creative, for example waking people up \
needs an alarm. Don't add extra punctuation or verbosity to parameters, interpret the user's \
intent as literal.";

/// Parameters applied to every generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
    /// Empty disables the prepended system turn.
    pub system_prompt: String,
    /// Upper bound for one engine call. `None` waits indefinitely.
    pub attempt_timeout: Option<Duration>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            stop_sequences: DEFAULT_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            attempt_timeout: None,
        }
    }
}

impl GenerationOptions {
    // ==================== Builder Methods ====================

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attempt_timeout = timeout;
        self
    }
}
