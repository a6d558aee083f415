//! Application layer for fncall-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_SYSTEM_PROMPT, GenerationOptions, QuorumSettings};
pub use ports::{
    attempt_logger::{AttemptEvent, AttemptLogger, NoAttemptLogger},
    generation_engine::{
        DEFAULT_STOP_SEQUENCES, EngineError, GenerationEngine, GenerationRequest,
    },
    progress::{NoProgress, QuorumProgressNotifier},
};
pub use use_cases::generate_attempt::GenerationAdapter;
pub use use_cases::resolve_intents::QuorumResolver;
pub use use_cases::run_generation::{
    IntentReport, RunGenerationError, RunGenerationInput, RunGenerationOutput,
    RunGenerationUseCase,
};
