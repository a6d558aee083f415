//! Schema validation and argument coercion
//!
//! Turns repaired model text into the calls a [`ToolSet`] actually admits.
//! Nothing here fails: malformed input degrades to omitted calls or
//! omitted arguments, and the [`ValidationReport`] says how much was lost.

use crate::attempt::AttemptResult;
use crate::tool::{FunctionCall, ParamType, ToolSchema, ToolSet};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// `"name": "...", "arguments": {...}` fragments inside otherwise broken text.
static CALL_FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""name"\s*:\s*"([^"]+)"\s*,\s*"arguments"\s*:\s*(\{[^}]+\})"#)
        .expect("invalid call fragment regex")
});

static NUMERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+\.?\d*").expect("invalid numeral regex"));

/// How much of a payload survived validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// The text was not JSON and calls were pulled out fragment by fragment
    pub extracted_fragments: bool,
    /// Candidate calls found before validation
    pub candidates: usize,
    pub dropped_calls: usize,
    /// Declared arguments whose value could not be coerced
    pub dropped_arguments: usize,
}

/// Validated calls plus the report describing what was discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub result: AttemptResult,
    pub report: ValidationReport,
}

/// Validate already-repaired text against `tools`.
///
/// See [`repair_json`](super::repair_json) for the repair step that normally
/// precedes this.
pub fn validate_output(repaired: &str, tools: &ToolSet) -> Validated {
    let mut report = ValidationReport::default();

    let root = match serde_json::from_str::<Value>(repaired) {
        Ok(value) => value,
        Err(_) => {
            report.extracted_fragments = true;
            extract_fragments(repaired)
        }
    };

    let candidates = candidate_calls(&root);
    report.candidates = candidates.len();

    let mut function_calls = Vec::new();
    for candidate in candidates {
        match validate_call(candidate, tools, &mut report.dropped_arguments) {
            Some(call) => function_calls.push(call),
            None => report.dropped_calls += 1,
        }
    }

    let result = AttemptResult {
        function_calls,
        total_time_ms: root_number(&root, "total_time_ms"),
        confidence: root_number(&root, "confidence"),
        ..AttemptResult::default()
    };

    Validated { result, report }
}

fn extract_fragments(text: &str) -> Value {
    let calls: Vec<Value> = CALL_FRAGMENT_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let arguments = serde_json::from_str::<Value>(&caps[2]).ok()?;
            Some(serde_json::json!({ "name": &caps[1], "arguments": arguments }))
        })
        .collect();
    serde_json::json!({ "function_calls": calls })
}

fn candidate_calls(root: &Value) -> Vec<&Value> {
    let list = match root {
        Value::Object(map) => map.get("function_calls"),
        Value::Array(_) => Some(root),
        _ => None,
    };
    match list {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    }
}

fn root_number(root: &Value, key: &str) -> f64 {
    root.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn validate_call(candidate: &Value, tools: &ToolSet, dropped_arguments: &mut usize) -> Option<FunctionCall> {
    let name = candidate.get("name")?.as_str()?;
    let tool = tools.get(name)?;
    let arguments = match candidate.get("arguments")? {
        Value::Object(map) => map.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            _ => return None,
        },
        _ => return None,
    };

    let coerced = coerce_arguments(tool, &arguments, dropped_arguments);

    if tool.required_names().iter().all(|r| coerced.contains_key(r)) {
        Some(FunctionCall {
            name: name.to_string(),
            arguments: coerced,
        })
    } else {
        None
    }
}

/// Keep only declared arguments, coerced to their declared type, in
/// declaration order.
fn coerce_arguments(tool: &ToolSchema, arguments: &Map<String, Value>, dropped: &mut usize) -> Map<String, Value> {
    let mut coerced = Map::new();
    for param in tool.parameters() {
        let Some(value) = arguments.get(&param.name) else {
            continue;
        };
        match coerce_value(value, param.param_type()) {
            Some(value) => {
                coerced.insert(param.name.clone(), value);
            }
            None => *dropped += 1,
        }
    }
    coerced
}

/// Coerce one value to `param_type`. `None` drops the argument.
pub fn coerce_value(value: &Value, param_type: ParamType) -> Option<Value> {
    match param_type {
        ParamType::Integer => numeric_magnitude(value).and_then(truncate_to_integer),
        ParamType::Number => numeric_magnitude(value).and_then(float_value),
        ParamType::String => Some(Value::String(stringify(value).trim().to_string())),
        ParamType::Unconstrained => Some(value.clone()),
    }
}

/// A numeric reading of `value` with its sign dropped.
fn numeric_magnitude(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(text) => NUMERAL_RE.find(text)?.as_str().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number.abs())
}

fn truncate_to_integer(magnitude: f64) -> Option<Value> {
    let truncated = magnitude.trunc();
    if truncated < u64::MAX as f64 {
        Some(Value::from(truncated as u64))
    } else {
        None
    }
}

fn float_value(magnitude: f64) -> Option<Value> {
    serde_json::Number::from_f64(magnitude).map(Value::Number)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
