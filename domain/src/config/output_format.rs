//! Output format value object

use serde::{Deserialize, Serialize};

/// How a [`CombinedResult`](crate::result::CombinedResult) is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Calls plus source, timing and per-intent outcomes
    Full,
    /// Only the function calls (default)
    #[default]
    Calls,
    /// The combined result as JSON
    Json,
}
