//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`GenerationOptions`]: what every engine call carries (prompt, limits)
//! - [`QuorumSettings`]: attempts, agreement rule, worker pool, timeouts

pub mod generation_options;
pub mod quorum_settings;

pub use generation_options::{DEFAULT_SYSTEM_PROMPT, GenerationOptions};
pub use quorum_settings::QuorumSettings;
