//! Generation engine adapters
//!
//! - [`ProcessEngine`] runs the on-device model as a child process per attempt
//! - [`GeminiEngine`] calls the Gemini API (requires the `cloud` feature)
//! - [`UnconfiguredEngine`] stands in for an engine the config leaves out

#[cfg(feature = "cloud")]
pub mod gemini;
pub mod process;
pub mod unconfigured;

#[cfg(feature = "cloud")]
pub use gemini::{GeminiConfig, GeminiEngine};
pub use process::{ProcessEngine, ProcessEngineConfig};
pub use unconfigured::UnconfiguredEngine;
