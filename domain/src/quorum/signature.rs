//! Canonical equality key for call lists

use crate::tool::FunctionCall;
use serde_json::{Map, Value};

/// Deterministic encoding of a call list, used only to compare answers.
///
/// Object keys are sorted at every depth, so two attempts that emit the same
/// arguments in a different key order agree. Call order is kept: the same
/// calls in another order are a different answer.
///
/// # Example
///
/// ```
/// use fncall_domain::quorum::Signature;
/// use fncall_domain::tool::FunctionCall;
///
/// let a = FunctionCall::new("send_message").with_arg("recipient", "Bob").with_arg("message", "hi");
/// let b = FunctionCall::new("send_message").with_arg("message", "hi").with_arg("recipient", "Bob");
/// assert_eq!(Signature::of(&[a]), Signature::of(&[b]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn of(calls: &[FunctionCall]) -> Self {
        let canonical: Vec<Value> = calls
            .iter()
            .map(|call| {
                let mut entry = Map::new();
                entry.insert("arguments".to_string(), canonicalize_map(&call.arguments));
                entry.insert("name".to_string(), Value::String(call.name.clone()));
                Value::Object(entry)
            })
            .collect();
        Self(Value::Array(canonical).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => canonicalize_map(map),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// Maps keep insertion order, so rebuild in sorted key order.
fn canonicalize_map(map: &Map<String, Value>) -> Value {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    let sorted: Map<String, Value> = keys
        .into_iter()
        .map(|k| (k.clone(), canonicalize(&map[k])))
        .collect();
    Value::Object(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_insensitive() {
        let a = FunctionCall::new("set_alarm").with_arg("hour", 7).with_arg("minute", 30);
        let b = FunctionCall::new("set_alarm").with_arg("minute", 30).with_arg("hour", 7);
        assert_eq!(Signature::of(&[a]), Signature::of(&[b]));
    }

    #[test]
    fn test_nested_key_order_insensitive() {
        let a = FunctionCall::new("t").with_arg("opts", json!({"x": 1, "y": {"b": 2, "a": 1}}));
        let b = FunctionCall::new("t").with_arg("opts", json!({"y": {"a": 1, "b": 2}, "x": 1}));
        assert_eq!(Signature::of(&[a]), Signature::of(&[b]));
    }

    #[test]
    fn test_call_order_sensitive() {
        let a = FunctionCall::new("a");
        let b = FunctionCall::new("b");
        assert_ne!(
            Signature::of(&[a.clone(), b.clone()]),
            Signature::of(&[b, a])
        );
    }

    #[test]
    fn test_values_distinguish() {
        let a = FunctionCall::new("get_weather").with_arg("location", "SF");
        let b = FunctionCall::new("get_weather").with_arg("location", "San Francisco");
        assert_ne!(Signature::of(&[a]), Signature::of(&[b]));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(Signature::of(&[]).as_str(), "[]");
    }

    #[test]
    fn test_encoding_shape() {
        let call = FunctionCall::new("get_weather").with_arg("location", "SF");
        assert_eq!(
            Signature::of(&[call]).to_string(),
            r#"[{"arguments":{"location":"SF"},"name":"get_weather"}]"#
        );
    }
}
