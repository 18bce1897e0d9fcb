use crate::config::{RuleConfig, Severity};
use crate::rules::{
    in_spans, string_literals, value_texts, Finding, LintContext, Rule, RuleBuildError,
};
use regex::Regex;

pub const ID: &str = "zero-unit";

/// Length units are omitted on zero values: `margin: 0`, not `margin: 0px`.
///
/// Only length units are flagged; `0s`, `0deg` and `0%` keep their units.
/// Custom properties are skipped since their values may be used in `calc()`,
/// and so are the arguments of `calc()`, `min()`, `max()` and `clamp()`,
/// where a unitless zero is not a length. Sass directive arguments
/// (`@include pad(0px)`) are checked like declaration values.
#[derive(Debug)]
pub struct ZeroUnitRule {
    severity: Severity,
    zero: Regex,
    math: Regex,
}

impl ZeroUnitRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        let zero = Regex::new(
            r"(?i)(?:^|[\s,(/])([-+]?0+(?:\.0+)?)(px|em|rem|ex|ch|vw|vh|vmin|vmax|cm|mm|q|in|pt|pc)\b",
        )
        .map_err(|e| RuleBuildError::InvalidRegex(config.id.clone(), e))?;
        let math = Regex::new(r"(?i)(?:^|[^\w-])(?:-(?:webkit|moz)-)?(?:calc|min|max|clamp)\(")
            .map_err(|e| RuleBuildError::InvalidRegex(config.id.clone(), e))?;
        Ok(Self {
            severity: config.severity,
            zero,
            math,
        })
    }

    /// Byte ranges of math function arguments, from the `(` to just past
    /// its matching `)` (or the end of `text` when unbalanced).
    fn math_arguments(&self, text: &str) -> Vec<(usize, usize)> {
        let bytes = text.as_bytes();
        self.math
            .find_iter(text)
            .map(|m| {
                let open = m.end() - 1;
                let mut depth = 0usize;
                let mut quote: Option<u8> = None;
                let mut i = open;
                while i < bytes.len() {
                    match (quote, bytes[i]) {
                        (Some(_), b'\\') => i += 1,
                        (Some(q), b) if b == q => quote = None,
                        (Some(_), _) => {}
                        (None, q @ (b'"' | b'\'')) => quote = Some(q),
                        (None, b'(') => depth += 1,
                        (None, b')') => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return (open, i + 1);
                            }
                        }
                        (None, _) => {}
                    }
                    i += 1;
                }
                (open, bytes.len())
            })
            .collect()
    }
}

impl Rule for ZeroUnitRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for value in value_texts(ctx.stylesheet) {
            if value.owner.starts_with("--") {
                continue;
            }
            let strings = string_literals(value.text);
            let math = self.math_arguments(value.text);

            for caps in self.zero.captures_iter(value.text) {
                let (Some(number), Some(unit)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let at = number.start();
                if in_spans(&strings, at) || math.iter().any(|&(s, e)| at >= s && at < e) {
                    continue;
                }
                findings.push(
                    ctx.finding(
                        self,
                        value.position_at(at),
                        format!(
                            "unit '{}' is unnecessary on a zero value in '{}'",
                            unit.as_str(),
                            value.owner
                        ),
                    )
                    .with_suggest("0"),
                );
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::lint;

    fn check(content: &str) -> Vec<Finding> {
        let rule = ZeroUnitRule::new(&RuleConfig::default()).unwrap();
        lint(&rule, content)
    }

    #[test]
    fn bare_zero_passes() {
        assert!(check(".a {\n  margin: 0;\n  padding: 0 10px;\n}").is_empty());
    }

    #[test]
    fn zero_with_unit() {
        let findings = check(".a {\n  margin: 0px;\n}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].column, Some(11));
    }

    #[test]
    fn every_zero_in_shorthand() {
        assert_eq!(check(".a { margin: 0px 0em 10px 0.0rem; }").len(), 3);
    }

    #[test]
    fn non_zero_and_non_length_units_pass() {
        assert!(check(".a { width: 10px; top: 100px; transition: opacity 0s; transform: rotate(0deg); flex-basis: 0%; }").is_empty());
    }

    #[test]
    fn math_function_arguments_keep_units() {
        assert!(check(".a {\n  width: calc(0px + 1em);\n}").is_empty());
        assert!(check(".a { width: clamp(0rem, 2vw, 3rem); height: max(0px, 50% - 1em); }").is_empty());
        assert!(check(".a { width: -webkit-calc(100% - 0px); }").is_empty());
    }

    #[test]
    fn other_functions_are_checked() {
        let findings = check(".a { transform: translate(0px, 10px); width: calc(1em) 0px; }");
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.suggest.as_deref() == Some("0")));
    }

    #[test]
    fn directive_arguments() {
        let findings = check(".a {\n  @include pad(0px);\n}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].column, Some(16));
        assert!(findings[0].message.contains("'@include'"));
    }

    #[test]
    fn media_queries_are_skipped() {
        assert!(check("@media (min-width: 0px) {\n  .a {\n    margin: 0;\n  }\n}").is_empty());
    }

    #[test]
    fn custom_properties_are_skipped() {
        assert!(check(":root { --gap: 0px; }").is_empty());
    }
}
