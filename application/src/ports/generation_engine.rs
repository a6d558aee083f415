//! Generation engine port
//!
//! Defines the interface for one constrained generation call against a
//! model runtime (on-device or cloud).

use async_trait::async_trait;
use fncall_domain::{EngineKind, Message, ToolSet};
use std::time::Duration;
use thiserror::Error;

/// Default stop sequences for chat-tuned small models
pub const DEFAULT_STOP_SEQUENCES: [&str; 2] = ["<|im_end|>", "<end_of_turn>"];

/// Errors that can occur during a generation call
///
/// A failed call is a non-vote. It never turns into an empty answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Failed to start engine: {0}")]
    Spawn(String),

    #[error("Engine I/O error: {0}")]
    Io(String),

    #[error("Engine exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Engine produced no output")]
    EmptyOutput,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("Engine not configured: {0}")]
    NotConfigured(String),

    #[error("Generation cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}

/// One generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<Message>,
    pub tools: ToolSet,
    /// The model must answer with tool calls
    pub force_tools: bool,
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
}

impl GenerationRequest {
    pub fn new(messages: Vec<Message>, tools: ToolSet) -> Self {
        Self {
            messages,
            tools,
            force_tools: true,
            max_tokens: 256,
            stop_sequences: DEFAULT_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Engine that turns a conversation plus tools into raw model text
///
/// Implementations (adapters) live in the infrastructure layer. They own
/// whatever model handle they need for the duration of one call and must
/// release it when the returned future is dropped.
#[async_trait]
pub trait GenerationEngine: Send + Sync {
    /// Which side of the hybrid split this engine runs on
    fn kind(&self) -> EngineKind;

    /// Display name for logs
    fn name(&self) -> String {
        self.kind().to_string()
    }

    /// Run one generation and return the unparsed output text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError>;
}
