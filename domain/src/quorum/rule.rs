//! Agreement rules for signature voting
//!
//! A rule turns the number of attempts dispatched for an intent into the
//! number of identical answers needed before the intent is resolved.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Rule for determining when enough attempts agree
///
/// - `Majority`: more than half of the attempts (default; 2 of 3)
/// - `Unanimous`: every attempt
/// - `AtLeast(n)`: at least n attempts
/// - `Percentage(p)`: at least p% of the attempts, rounded up
///
/// # Example
///
/// ```
/// use fncall_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::Majority;
/// assert_eq!(rule.threshold(3), 2);
/// assert_eq!(rule.checked_threshold(3), Ok(2));
///
/// let strict = QuorumRule::Unanimous;
/// assert_eq!(strict.threshold(3), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum QuorumRule {
    /// More than half must agree (n/2 + 1)
    #[default]
    Majority,

    /// All attempts must agree
    Unanimous,

    /// At least n attempts must agree
    AtLeast(usize),

    /// At least this percentage must agree (0-100)
    Percentage(u8),
}

impl QuorumRule {
    /// Number of identical answers needed given the attempt count
    pub fn threshold(&self, attempts: usize) -> usize {
        match self {
            QuorumRule::Majority => attempts / 2 + 1,
            QuorumRule::Unanimous => attempts,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (attempts as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }

    /// Resolve the threshold for `attempts`, rejecting rules that can never
    /// be met or are met before any attempt completes.
    pub fn checked_threshold(&self, attempts: usize) -> Result<usize, DomainError> {
        let threshold = self.threshold(attempts);
        if threshold == 0 || threshold > attempts {
            return Err(DomainError::UnreachableThreshold {
                threshold,
                attempts,
            });
        }
        Ok(threshold)
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all must agree)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} agreeing", n),
            QuorumRule::Percentage(p) => format!("at least {}% agreeing", p),
        }
    }

    /// Canonical string form, as accepted by [`FromStr`](std::str::FromStr)
    pub fn as_config_str(&self) -> String {
        match self {
            QuorumRule::Majority => "majority".to_string(),
            QuorumRule::Unanimous => "unanimous".to_string(),
            QuorumRule::AtLeast(n) => format!("atleast:{}", n),
            QuorumRule::Percentage(p) => format!("percentage:{}", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidRule(s.to_string());
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or_else(invalid)?
                    .trim()
                    .parse()
                    .map_err(|_| invalid())?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.trim().parse().map_err(|_| invalid())?;
                if p > 100 {
                    return Err(invalid());
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for QuorumRule {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuorumRule> for String {
    fn from(rule: QuorumRule) -> Self {
        rule.as_config_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_rule() {
        let rule = QuorumRule::Majority;

        // 3 attempts: 2 agreeing
        assert_eq!(rule.threshold(3), 2);
        // 4 attempts: 3 agreeing
        assert_eq!(rule.threshold(4), 3);
        assert_eq!(rule.threshold(1), 1);
    }

    #[test]
    fn test_unanimous_rule() {
        let rule = QuorumRule::Unanimous;

        assert_eq!(rule.threshold(3), 3);
        assert_eq!(rule.threshold(1), 1);
    }

    #[test]
    fn test_at_least_and_percentage() {
        assert_eq!(QuorumRule::AtLeast(2).threshold(5), 2);
        assert_eq!(QuorumRule::Percentage(75).threshold(4), 3);
        assert_eq!(QuorumRule::Percentage(75).threshold(5), 4);
    }

    #[test]
    fn test_zero_attempts() {
        assert!(QuorumRule::Unanimous.checked_threshold(0).is_err());
        assert!(QuorumRule::AtLeast(0).checked_threshold(3).is_err());
    }

    #[test]
    fn test_checked_threshold() {
        assert_eq!(QuorumRule::Majority.checked_threshold(3), Ok(2));
        assert_eq!(QuorumRule::AtLeast(1).checked_threshold(3), Ok(1));
        assert_eq!(
            QuorumRule::AtLeast(4).checked_threshold(3),
            Err(DomainError::UnreachableThreshold {
                threshold: 4,
                attempts: 3
            })
        );
        assert!(QuorumRule::Percentage(0).checked_threshold(3).is_err());
        assert!(QuorumRule::Majority.checked_threshold(0).is_err());
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!("majority".parse::<QuorumRule>(), Ok(QuorumRule::Majority));
        assert_eq!("Unanimous".parse::<QuorumRule>(), Ok(QuorumRule::Unanimous));
        assert_eq!("atleast:2".parse::<QuorumRule>(), Ok(QuorumRule::AtLeast(2)));
        assert_eq!("at_least:3".parse::<QuorumRule>(), Ok(QuorumRule::AtLeast(3)));
        assert_eq!(
            "percentage:75".parse::<QuorumRule>(),
            Ok(QuorumRule::Percentage(75))
        );
        assert_eq!("80%".parse::<QuorumRule>(), Ok(QuorumRule::Percentage(80)));
        assert!("150%".parse::<QuorumRule>().is_err());
        assert!("plurality".parse::<QuorumRule>().is_err());
    }

    #[test]
    fn test_config_string_roundtrip() {
        for rule in [
            QuorumRule::Majority,
            QuorumRule::Unanimous,
            QuorumRule::AtLeast(2),
            QuorumRule::Percentage(60),
        ] {
            assert_eq!(rule.as_config_str().parse::<QuorumRule>(), Ok(rule));
        }
    }

    #[test]
    fn test_serde_as_string() {
        let rule: QuorumRule = serde_json::from_str("\"atleast:2\"").unwrap();
        assert_eq!(rule, QuorumRule::AtLeast(2));
        assert_eq!(serde_json::to_string(&QuorumRule::Majority).unwrap(), "\"majority\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(QuorumRule::Majority.to_string(), "majority (more than half)");
    }
}
