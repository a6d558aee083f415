//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod mode;
mod output_format;

pub use mode::{CloudFallback, GenerationMode};
pub use output_format::OutputFormat;
