//! Domain layer for fncall-quorum
//!
//! This crate contains the pure logic of the function-call reliability
//! layer. It performs no I/O and has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Output processing
//!
//! Raw model text is repaired ([`output::repair_json`]) and validated against
//! a [`ToolSet`] ([`output::validate_output`]). Malformed output degrades to
//! omitted calls; it is never an error.
//!
//! ## Intents
//!
//! A request such as "text Bob and set an alarm" is split into [`Intent`]s,
//! each with the few tools it most likely needs.
//!
//! ## Quorum
//!
//! Every intent is attempted several times. Answers are compared by
//! [`Signature`] and the first to gather [`QuorumRule::threshold`] identical
//! votes wins; otherwise the first completed attempt stands in.

pub mod attempt;
pub mod config;
pub mod conversation;
pub mod core;
pub mod intent;
pub mod output;
pub mod quorum;
pub mod result;
pub mod tool;

// Re-export commonly used types
pub use attempt::{AttemptResult, EngineKind, RawAttempt};
pub use config::{CloudFallback, GenerationMode, OutputFormat};
pub use conversation::{Message, Role};
pub use core::{
    error::DomainError,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use intent::{Intent, IntentSegmenter, SegmenterConfig};
pub use output::{ValidationReport, Validated, parse_and_validate, repair_json, validate_output};
pub use quorum::{IntentOutcome, IntentResolution, QuorumRule, Signature, VoteOutcome, VoteTally};
pub use result::{CombinedResult, ResultSource};
pub use tool::{FunctionCall, ParamType, ToolParameter, ToolSchema, ToolSet};
