//! The combined answer returned to callers

use crate::attempt::{AttemptResult, EngineKind};
use crate::quorum::IntentResolution;
use crate::tool::FunctionCall;
use serde::{Deserialize, Serialize};

/// Where a [`CombinedResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultSource {
    #[serde(rename = "on-device")]
    OnDevice,
    #[serde(rename = "on-device (quorum)")]
    OnDeviceQuorum,
    #[serde(rename = "on-device (no quorum)")]
    OnDeviceNoQuorum,
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "error")]
    Error,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::OnDevice => "on-device",
            ResultSource::OnDeviceQuorum => "on-device (quorum)",
            ResultSource::OnDeviceNoQuorum => "on-device (no quorum)",
            ResultSource::Cloud => "cloud",
            ResultSource::Error => "error",
        }
    }

    /// Source label for a single attempt on `engine`.
    pub fn for_engine(engine: EngineKind) -> Self {
        match engine {
            EngineKind::OnDevice => ResultSource::OnDevice,
            EngineKind::Cloud => ResultSource::Cloud,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ResultSource::OnDeviceNoQuorum | ResultSource::Error)
    }
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final answer for a request.
///
/// Serializes as `{"function_calls": [...], "source": "...",
/// "total_time_ms": ..., "confidence": ...}`; `confidence` is omitted when
/// unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub function_calls: Vec<FunctionCall>,
    pub source: ResultSource,
    pub total_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl CombinedResult {
    /// Result of a single attempt (on-device or cloud mode).
    pub fn from_attempt(result: AttemptResult) -> Self {
        Self {
            source: ResultSource::for_engine(result.engine),
            total_time_ms: result.total_time_ms,
            confidence: Some(result.confidence),
            function_calls: result.function_calls,
        }
    }

    /// A request that produced nothing usable.
    pub fn error(total_time_ms: f64) -> Self {
        Self {
            function_calls: Vec::new(),
            source: ResultSource::Error,
            total_time_ms,
            confidence: None,
        }
    }

    /// Merge per-intent resolutions, in intent order.
    ///
    /// The source is `on-device (quorum)` when every intent reached quorum,
    /// `error` when no intent had a single completed attempt, and
    /// `on-device (no quorum)` otherwise. Confidence is the fraction of
    /// intents that reached quorum.
    pub fn from_resolutions(resolutions: &[IntentResolution]) -> Self {
        let function_calls = resolutions
            .iter()
            .flat_map(|r| r.chosen.function_calls.iter().cloned())
            .collect();
        let total_time_ms = resolutions.iter().map(|r| r.chosen.total_time_ms).sum();

        let reached = resolutions.iter().filter(|r| r.reached_quorum()).count();
        let any_completed = resolutions.iter().any(|r| r.completed > 0);

        let source = if !resolutions.is_empty() && reached == resolutions.len() {
            ResultSource::OnDeviceQuorum
        } else if !any_completed {
            ResultSource::Error
        } else {
            ResultSource::OnDeviceNoQuorum
        };

        let confidence = if resolutions.is_empty() {
            None
        } else {
            Some(reached as f64 / resolutions.len() as f64)
        };

        Self {
            function_calls,
            source,
            total_time_ms,
            confidence,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.function_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::IntentOutcome;
    use serde_json::json;

    fn resolution(outcome: IntentOutcome, call: &str, time: f64) -> IntentResolution {
        let completed = if outcome == IntentOutcome::Failed { 0 } else { 2 };
        let calls = if outcome == IntentOutcome::Failed {
            Vec::new()
        } else {
            vec![FunctionCall::new(call)]
        };
        IntentResolution {
            chosen: AttemptResult::new(calls).with_time_ms(time),
            outcome,
            completed,
            failed: 0,
            agreement: completed,
        }
    }

    #[test]
    fn test_all_quorum() {
        let result = CombinedResult::from_resolutions(&[
            resolution(IntentOutcome::Quorum, "a", 10.0),
            resolution(IntentOutcome::Quorum, "b", 5.0),
        ]);
        assert_eq!(result.source, ResultSource::OnDeviceQuorum);
        assert_eq!(result.total_time_ms, 15.0);
        assert_eq!(result.confidence, Some(1.0));
        let names: Vec<_> = result.function_calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_mixed_is_no_quorum() {
        let result = CombinedResult::from_resolutions(&[
            resolution(IntentOutcome::Quorum, "a", 1.0),
            resolution(IntentOutcome::NoQuorum, "b", 1.0),
        ]);
        assert_eq!(result.source, ResultSource::OnDeviceNoQuorum);
        assert_eq!(result.confidence, Some(0.5));
    }

    #[test]
    fn test_failed_intent_alongside_quorum_is_no_quorum() {
        let result = CombinedResult::from_resolutions(&[
            resolution(IntentOutcome::Quorum, "a", 1.0),
            resolution(IntentOutcome::Failed, "", 0.0),
        ]);
        assert_eq!(result.source, ResultSource::OnDeviceNoQuorum);
        assert_eq!(result.function_calls.len(), 1);
    }

    #[test]
    fn test_all_failed_is_error() {
        let result = CombinedResult::from_resolutions(&[resolution(IntentOutcome::Failed, "", 0.0)]);
        assert_eq!(result.source, ResultSource::Error);
        assert!(result.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let result = CombinedResult {
            function_calls: vec![FunctionCall::new("get_weather").with_arg("location", "SF")],
            source: ResultSource::OnDeviceQuorum,
            total_time_ms: 12.5,
            confidence: None,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "function_calls": [{"name": "get_weather", "arguments": {"location": "SF"}}],
                "source": "on-device (quorum)",
                "total_time_ms": 12.5
            })
        );
    }

    #[test]
    fn test_from_attempt_uses_engine_label() {
        let attempt = AttemptResult::new(vec![FunctionCall::new("x")]).with_engine(EngineKind::Cloud);
        assert_eq!(CombinedResult::from_attempt(attempt).source, ResultSource::Cloud);
    }
}
