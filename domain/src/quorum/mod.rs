//! Quorum domain module
//!
//! Self-consistency voting over repeated generation attempts. Each intent is
//! attempted several times; answers are compared by [`Signature`] and the
//! first one to gather enough identical votes wins.
//!
//! # Key Types
//!
//! - [`QuorumRule`]: how many identical answers are enough
//! - [`Signature`]: canonical equality key of a call list
//! - [`VoteTally`]: signature counts, first-completed fallback
//! - [`IntentResolution`] / [`IntentOutcome`]: the settled answer per intent

pub mod resolution;
pub mod rule;
pub mod signature;
pub mod tally;

pub use resolution::{IntentOutcome, IntentResolution};
pub use rule::QuorumRule;
pub use signature::Signature;
pub use tally::{VoteOutcome, VoteTally};
