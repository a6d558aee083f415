//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod generate_attempt;
pub mod resolve_intents;
pub mod run_generation;

#[cfg(test)]
pub(crate) mod test_support;
