//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod attempt_logger;
pub mod generation_engine;
pub mod progress;
