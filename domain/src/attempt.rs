//! Generation attempts and their validated results

use crate::tool::FunctionCall;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which generation engine produced an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    #[default]
    OnDevice,
    Cloud,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::OnDevice => "on-device",
            EngineKind::Cloud => "cloud",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unparsed text returned by one engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttempt {
    pub text: String,
    pub elapsed: Duration,
    pub engine: EngineKind,
}

impl RawAttempt {
    pub fn new(text: impl Into<String>, elapsed: Duration, engine: EngineKind) -> Self {
        Self {
            text: text.into(),
            elapsed,
            engine,
        }
    }
}

/// The calls validated out of one [`RawAttempt`], plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttemptResult {
    pub function_calls: Vec<FunctionCall>,
    pub total_time_ms: f64,
    /// Engine-reported confidence, `0.0` when the payload carried none.
    pub confidence: f64,
    pub engine: EngineKind,
}

impl AttemptResult {
    pub fn new(function_calls: Vec<FunctionCall>) -> Self {
        Self {
            function_calls,
            ..Self::default()
        }
    }

    /// Empty result used when an intent produced nothing usable.
    pub fn empty(engine: EngineKind) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn with_time_ms(mut self, total_time_ms: f64) -> Self {
        self.total_time_ms = total_time_ms;
        self
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.function_calls.is_empty()
    }
}
