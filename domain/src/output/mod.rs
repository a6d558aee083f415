//! Model output processing
//!
//! ```text
//! raw text ──▶ repair_json ──▶ validate_output ──▶ AttemptResult
//! ```
//!
//! Both stages are pure and total. A payload that cannot be salvaged yields
//! an empty call list, never an error.

pub mod repair;
pub mod validate;

pub use repair::repair_json;
pub use validate::{ValidationReport, Validated, coerce_value, validate_output};

use crate::attempt::AttemptResult;
use crate::tool::ToolSet;

/// Repair then validate in one step.
pub fn parse_and_validate(raw: &str, tools: &ToolSet) -> AttemptResult {
    validate_output(&repair_json(raw), tools).result
}
