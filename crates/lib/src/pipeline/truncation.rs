//! # Truncation Detection
//!
//! Heuristics that flag an oracle response cut off before completing its
//! structured output. Any warning triggers a retry before the parsed item
//! count is even considered.

use crate::pipeline::responses::clean_json_response;

/// A structural signal that a response was cut off mid-output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationWarning {
    /// An opening array/object bracket never closed.
    UnbalancedBrackets,
    /// The response does not end in the terminator its opening implies.
    MissingTerminator,
    /// A dangling fragment (unclosed string, trailing comma or colon) after
    /// the last complete value.
    DanglingFragment,
}

/// Scans a raw oracle response for truncation signals.
///
/// The scan is a single pass that tracks string state and bracket depth, so
/// brackets inside JSON string values do not count.
pub fn detect_truncation(raw: &str) -> Vec<TruncationWarning> {
    let cleaned = clean_json_response(raw);
    if cleaned.is_empty() {
        return vec![TruncationWarning::MissingTerminator];
    }

    let mut warnings = Vec::new();
    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut saw_open = false;

    for c in cleaned.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => {
                saw_open = true;
                depth += 1;
            }
            ']' | '}' => depth -= 1,
            _ => {}
        }
    }

    if saw_open && depth > 0 {
        warnings.push(TruncationWarning::UnbalancedBrackets);
    }

    let expected_terminator = match cleaned.chars().next() {
        Some('[') => Some(']'),
        Some('{') => Some('}'),
        _ => None,
    };
    if let Some(terminator) = expected_terminator {
        if cleaned.chars().last() != Some(terminator) {
            warnings.push(TruncationWarning::MissingTerminator);
        }
    }

    // A cut inside a string value, or right after a field name or value
    // separator, leaves a dangling fragment.
    let last_significant = cleaned.trim_end().chars().last();
    if in_string || matches!(last_significant, Some(',') | Some(':')) {
        warnings.push(TruncationWarning::DanglingFragment);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_object_is_flagged() {
        let raw = r#"[{"name":"Burger","basePrice":"$8.00"#;
        let warnings = detect_truncation(raw);
        assert!(!warnings.is_empty());
        assert!(warnings.contains(&TruncationWarning::UnbalancedBrackets));
    }

    #[test]
    fn complete_array_is_clean() {
        let raw = r#"[{"name":"Burger","basePrice":"$8.00"},{"name":"Fries","basePrice":"$3.00"}]"#;
        assert!(detect_truncation(raw).is_empty());
    }

    #[test]
    fn fenced_complete_array_is_clean() {
        let raw = "```json\n[{\"name\":\"Burger\",\"basePrice\":\"$8.00\"}]\n```";
        assert!(detect_truncation(raw).is_empty());
    }

    #[test]
    fn cut_inside_a_string_is_a_dangling_fragment() {
        let raw = r#"[{"name":"Burger","basePrice":"$8.0"#;
        let warnings = detect_truncation(raw);
        assert!(warnings.contains(&TruncationWarning::DanglingFragment));
    }

    #[test]
    fn trailing_comma_after_last_object_is_a_dangling_fragment() {
        let raw = r#"[{"name":"Burger","basePrice":"$8.00"},"#;
        let warnings = detect_truncation(raw);
        assert!(warnings.contains(&TruncationWarning::DanglingFragment));
    }

    #[test]
    fn brackets_inside_string_values_do_not_count() {
        let raw = r#"[{"name":"Wings [6 pc]","basePrice":"$7.00"}]"#;
        assert!(detect_truncation(raw).is_empty());
    }

    #[test]
    fn empty_response_is_flagged() {
        assert_eq!(
            detect_truncation("   "),
            vec![TruncationWarning::MissingTerminator]
        );
    }
}
