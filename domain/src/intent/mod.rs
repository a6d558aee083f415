//! Intent domain module
//!
//! Multi-command requests ("text Bob and set an alarm") are split into
//! intents that are generated and voted on independently.

pub mod entities;
pub mod lexicon;
pub mod segmenter;

pub use entities::Intent;
pub use segmenter::{IntentSegmenter, SegmenterConfig};
