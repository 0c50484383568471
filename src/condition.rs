//! Condition expression evaluation
//!
//! Edge guards are `"<operator>:<operand>"` strings evaluated against the
//! upstream output. String operators compare case-sensitively; numeric
//! operators parse both sides as numbers. Anything that cannot be
//! evaluated (missing separator, unknown operator, non-numeric side of a
//! numeric comparison) evaluates to `false`, so a broken guard simply
//! never routes and the default edge (if any) takes over.

/// Evaluate a guard expression against a subject string.
pub fn evaluate(expression: &str, subject: &str) -> bool {
    let Some((op, operand)) = expression.split_once(':') else {
        return false;
    };

    match op {
        "contains" => subject.contains(operand),
        "equals" => subject == operand,
        "startswith" => subject.starts_with(operand),
        "endswith" => subject.ends_with(operand),
        ">" | "<" | ">=" | "<=" => {
            match (subject.trim().parse::<f64>(), operand.trim().parse::<f64>()) {
                (Ok(lhs), Ok(rhs)) => match op {
                    ">" => lhs > rhs,
                    "<" => lhs < rhs,
                    ">=" => lhs >= rhs,
                    _ => lhs <= rhs,
                },
                // Non-numeric comparison fails closed
                _ => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_case_sensitive() {
        assert!(evaluate("contains:yes", "well yes indeed"));
        assert!(!evaluate("contains:yes", "well YES indeed"));
        assert!(!evaluate("contains:yes", "nope"));
    }

    #[test]
    fn equals_matches_exactly() {
        assert!(evaluate("equals:done", "done"));
        assert!(!evaluate("equals:done", "done "));
        assert!(!evaluate("equals:done", "Done"));
    }

    #[test]
    fn startswith_and_endswith() {
        assert!(evaluate("startswith:ERR", "ERR: boom"));
        assert!(!evaluate("startswith:ERR", "warn: ERR"));
        assert!(evaluate("endswith:.json", "payload.json"));
        assert!(!evaluate("endswith:.json", "payload.jsonl"));
    }

    #[test]
    fn numeric_comparisons() {
        assert!(evaluate(">:10", "15"));
        assert!(!evaluate(">:10", "10"));
        assert!(evaluate(">=:10", "10"));
        assert!(evaluate("<:10", "9.5"));
        assert!(evaluate("<=:10", "10"));
        assert!(!evaluate("<=:10", "10.1"));
    }

    #[test]
    fn non_numeric_subject_fails_closed() {
        assert!(!evaluate(">:10", "abc"));
        assert!(!evaluate("<:10", ""));
        assert!(!evaluate(">=:not-a-number", "5"));
    }

    #[test]
    fn numeric_subject_may_carry_whitespace() {
        assert!(evaluate(">:10", " 15\n"));
    }

    #[test]
    fn malformed_expressions_fail_closed() {
        assert!(!evaluate("no separator here", "anything"));
        assert!(!evaluate("", "anything"));
        assert!(!evaluate("matches:regex", "regex"));
        assert!(!evaluate("CONTAINS:yes", "yes"));
    }

    #[test]
    fn empty_operand_is_legal_for_string_ops() {
        // Every string contains the empty string; mirrors direct
        // substring semantics rather than special-casing it
        assert!(evaluate("contains:", "anything"));
        assert!(evaluate("equals:", ""));
        assert!(!evaluate("equals:", "x"));
    }
}
