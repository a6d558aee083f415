//! Heuristic repair of JSON-shaped model output.
//!
//! Small models routinely emit payloads with stray control characters,
//! trailing commas, or a truncated tail. [`repair_json`] fixes the cheap
//! cases. It never fails and does not promise the result parses.

use regex::Regex;
use std::sync::LazyLock;

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("invalid trailing comma regex"));

fn is_stripped_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1f | 0x7f..=0x9f)
}

/// Repair a raw payload, applying in order:
///
/// 1. strip control characters (C0, DEL, C1),
/// 2. drop commas directly before `}` or `]`,
/// 3. append a `}` for every unmatched `{`,
/// 4. append a `]` for every unmatched `[`.
///
/// Delimiters inside string literals are counted too.
///
/// # Example
///
/// ```
/// use fncall_domain::output::repair_json;
///
/// assert_eq!(repair_json(r#"{"a": [1, 2,], "b": 3,"#), r#"{"a": [1, 2], "b": 3,}"#);
/// ```
pub fn repair_json(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !is_stripped_control(*c)).collect();

    let mut repaired = TRAILING_COMMA_RE.replace_all(&stripped, "$1").into_owned();

    let open_braces = unmatched(&repaired, '{', '}');
    repaired.extend(std::iter::repeat_n('}', open_braces));

    let open_brackets = unmatched(&repaired, '[', ']');
    repaired.extend(std::iter::repeat_n(']', open_brackets));

    repaired
}

fn unmatched(text: &str, open: char, close: char) -> usize {
    let opens = text.chars().filter(|&c| c == open).count();
    let closes = text.chars().filter(|&c| c == close).count();
    opens.saturating_sub(closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(text: &str) -> bool {
        unmatched(text, '{', '}') == 0 && unmatched(text, '[', ']') == 0
    }

    #[test]
    fn test_well_formed_json_unchanged() {
        let inputs = [
            r#"{"function_calls":[{"name":"get_weather","arguments":{"location":"SF"}}]}"#,
            r#"{"function_calls": [], "total_time_ms": 12.5, "confidence": 0.9}"#,
            "[1, 2, 3]",
        ];
        for input in inputs {
            let once = repair_json(input);
            assert_eq!(once, input);
            assert_eq!(repair_json(&once), once);
        }
    }

    #[test]
    fn test_strips_control_characters() {
        let input = "{\"a\":\u{0}1\u{7f},\u{85}\"b\":2}";
        assert_eq!(repair_json(input), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_newlines_are_stripped() {
        let input = "{\n  \"a\": 1\n}";
        assert_eq!(repair_json(input), "{  \"a\": 1}");
    }

    #[test]
    fn test_removes_trailing_commas() {
        assert_eq!(repair_json(r#"{"a": 1, }"#), r#"{"a": 1}"#);
        assert_eq!(repair_json(r#"[1, 2 ,  ]"#), r#"[1, 2 ]"#);
        assert_eq!(repair_json(r#"{"a": [1,], "b": {"c": 2,},}"#), r#"{"a": [1], "b": {"c": 2}}"#);
    }

    #[test]
    fn test_closes_truncated_object() {
        let repaired = repair_json(r#"{"function_calls": [{"name": "x", "arguments": {"a": 1"#);
        assert!(balanced(&repaired));
        assert!(repaired.ends_with("}}}]"));
    }

    #[test]
    fn test_balances_any_positive_imbalance() {
        let inputs = ["{{{", "[[", "{[", r#"{"a": [{"b": ["#, "{]"];
        for input in inputs {
            let repaired = repair_json(input);
            assert!(
                unmatched(&repaired, '{', '}') == 0,
                "braces unbalanced for {input:?}: {repaired:?}"
            );
            assert!(
                unmatched(&repaired, '[', ']') == 0,
                "brackets unbalanced for {input:?}: {repaired:?}"
            );
        }
    }

    #[test]
    fn test_excess_closers_left_alone() {
        assert_eq!(repair_json("{}}"), "{}}");
    }

    #[test]
    fn test_empty_and_plain_text() {
        assert_eq!(repair_json(""), "");
        assert_eq!(repair_json("no json here"), "no json here");
    }
}
