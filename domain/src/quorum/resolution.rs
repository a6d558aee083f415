//! Per-intent resolution records

use crate::attempt::AttemptResult;
use serde::{Deserialize, Serialize};

/// How an intent was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentOutcome {
    /// A signature reached the agreement threshold
    Quorum,
    /// Attempts completed but none agreed enough; first completed was used
    NoQuorum,
    /// No attempt completed
    Failed,
}

impl IntentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentOutcome::Quorum => "quorum",
            IntentOutcome::NoQuorum => "no quorum",
            IntentOutcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for IntentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The chosen answer for one intent and how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentResolution {
    pub chosen: AttemptResult,
    pub outcome: IntentOutcome,
    /// Attempts that returned a result and were counted
    pub completed: usize,
    /// Attempts that failed before the intent was decided
    pub failed: usize,
    /// Votes behind the chosen answer
    pub agreement: usize,
}

impl IntentResolution {
    /// Resolution for an intent that never got to run.
    pub fn failed() -> Self {
        Self {
            chosen: AttemptResult::default(),
            outcome: IntentOutcome::Failed,
            completed: 0,
            failed: 0,
            agreement: 0,
        }
    }

    pub fn reached_quorum(&self) -> bool {
        self.outcome == IntentOutcome::Quorum
    }
}
