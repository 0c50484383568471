//! Template variable interpolation
//!
//! Replaces `{{name}}` placeholders in node configuration strings with
//! values from the execution context. Whitespace inside the braces is
//! tolerated, variable names are case-sensitive, and unknown names are
//! left in place verbatim. Substitution is a single pass: a substituted
//! value is never re-scanned for further placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::context::ExecutionContext;

/// Pattern for {{name}} placeholders (whitespace-tolerant inside braces)
static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([\w.-]+)\s*\}\}").expect("template pattern is valid"));

/// Render a template against the execution context.
pub fn render(template: &str, ctx: &ExecutionContext) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match ctx.lookup(name) {
                Some(value) => value.to_string(),
                // Unknown variables stay as literal text
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(input: &str, prev_output: &str) -> ExecutionContext {
        let mut ctx = ExecutionContext::new(input);
        ctx.set_prev_output(prev_output);
        ctx
    }

    #[test]
    fn renders_input_variable() {
        assert_eq!(render("Q: {{input}}", &ctx("2+2", "")), "Q: 2+2");
    }

    #[test]
    fn renders_prev_output_variable() {
        assert_eq!(
            render("Summarize: {{prev_output}}", &ctx("x", "long text")),
            "Summarize: long text"
        );
    }

    #[test]
    fn unknown_variables_are_preserved() {
        assert_eq!(render("{{missing}}", &ctx("x", "y")), "{{missing}}");
    }

    #[test]
    fn whitespace_inside_braces_is_tolerated() {
        assert_eq!(render("{{ input }}", &ctx("hi", "")), "hi");
        assert_eq!(render("{{  prev_output  }}", &ctx("a", "b")), "b");
    }

    #[test]
    fn variable_names_are_case_sensitive() {
        assert_eq!(render("{{Input}}", &ctx("hi", "")), "{{Input}}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let mut context = ExecutionContext::new("seed");
        context.set_var("outer", "{{input}}");
        // The substituted value contains a placeholder but must stay literal
        assert_eq!(render("{{outer}}", &context), "{{input}}");
    }

    #[test]
    fn replaces_every_occurrence() {
        assert_eq!(
            render("{{input}} and {{input}} again", &ctx("go", "")),
            "go and go again"
        );
    }

    #[test]
    fn mixed_known_and_unknown() {
        assert_eq!(
            render("{{input}} / {{nope}} / {{prev_output}}", &ctx("a", "b")),
            "a / {{nope}} / b"
        );
    }

    #[test]
    fn extra_named_variables_resolve() {
        let mut context = ExecutionContext::new("in");
        context.set_var("lang", "French");
        assert_eq!(
            render("Translate {{input}} to {{lang}}", &context),
            "Translate in to French"
        );
    }
}
