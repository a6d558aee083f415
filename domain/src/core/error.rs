//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Malformed model output is never an error at this layer; it degrades to
/// omitted calls or arguments. These variants cover caller mistakes only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Duplicate parameter '{parameter}' in tool '{tool}'")]
    DuplicateParameter { tool: String, parameter: String },

    #[error("Empty tool name")]
    EmptyToolName,

    #[error("Invalid quorum rule: {0}")]
    InvalidRule(String),

    #[error("Quorum threshold {threshold} can never be reached with {attempts} attempts")]
    UnreachableThreshold { threshold: usize, attempts: usize },

    #[error("Invalid intent split pattern: {0}")]
    InvalidSplitPattern(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_parameter_message() {
        let error = DomainError::DuplicateParameter {
            tool: "set_alarm".to_string(),
            parameter: "hour".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Duplicate parameter 'hour' in tool 'set_alarm'"
        );
    }

    #[test]
    fn test_unreachable_threshold_message() {
        let error = DomainError::UnreachableThreshold {
            threshold: 4,
            attempts: 3,
        };
        assert_eq!(
            error.to_string(),
            "Quorum threshold 4 can never be reached with 3 attempts"
        );
    }
}
