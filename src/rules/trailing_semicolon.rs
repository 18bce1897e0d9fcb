use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_blocks;
use crate::syntax::Item;

pub const ID: &str = "trailing-semicolon";

/// The last declaration in a block still ends with `;`.
#[derive(Debug)]
pub struct TrailingSemicolonRule {
    severity: Severity,
}

impl TrailingSemicolonRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for TrailingSemicolonRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_blocks(ctx.stylesheet, &mut |_, items| {
            for item in items {
                let (is_last, semicolon, end) = match item {
                    // Malformed declarations are already reported as parse errors.
                    Item::Declaration(d) if !d.is_malformed() => (d.is_last, d.semicolon, d.end),
                    Item::AtStatement(a) => (a.is_last, a.semicolon, a.end),
                    _ => continue,
                };
                if is_last && semicolon.is_none() {
                    findings.push(
                        ctx.finding(self, end, "missing semicolon after the last declaration")
                            .with_suggest("add ';'"),
                    );
                }
            }
        });
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::lint;

    fn check(content: &str) -> Vec<Finding> {
        let rule = TrailingSemicolonRule::new(&RuleConfig::default()).unwrap();
        lint(&rule, content)
    }

    #[test]
    fn terminated_passes() {
        assert!(check(".a {\n  color: red;\n}").is_empty());
        assert!(check(".a { color: red; }").is_empty());
    }

    #[test]
    fn missing_on_last() {
        let findings = check(".a{color:#FFFFFF}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].column, Some(17));
    }

    #[test]
    fn nested_blocks() {
        let findings = check(".a {\n  color: red;\n  .b {\n    margin: 0\n  }\n}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(4));
    }

    #[test]
    fn at_statement_without_semicolon() {
        assert_eq!(check(".a {\n  @include b\n}").len(), 1);
    }

    #[test]
    fn empty_block_passes() {
        assert!(check(".a {}").is_empty());
    }
}
