use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_blocks;
use crate::syntax::Item;

pub const ID: &str = "one-declaration-per-line";

/// Each declaration goes on its own line, except inside single-line blocks
/// (those are judged by compact-form-eligibility).
#[derive(Debug)]
pub struct DeclarationPerLineRule {
    severity: Severity,
}

impl DeclarationPerLineRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for DeclarationPerLineRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_blocks(ctx.stylesheet, &mut |rule, items| {
            if rule.map_or(false, |r| r.is_single_line()) {
                return;
            }
            let statements: Vec<&Item> = items.iter().filter(|i| i.is_statement()).collect();
            for pair in statements.windows(2) {
                if pair[0].end().line == pair[1].start().line {
                    findings.push(
                        ctx.finding(
                            self,
                            pair[1].start(),
                            "declaration shares a line with the previous declaration",
                        )
                        .with_suggest("move each declaration onto its own line"),
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
        let rule = DeclarationPerLineRule::new(&RuleConfig::default()).unwrap();
        lint(&rule, content)
    }

    #[test]
    fn one_per_line_passes() {
        assert!(check(".a {\n  color: red;\n  margin: 0;\n}").is_empty());
    }

    #[test]
    fn shared_line() {
        let findings = check(".a {\n  color: red; margin: 0;\n}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].column, Some(15));
    }

    #[test]
    fn compact_block_is_exempt() {
        assert!(check(".a { color: red; margin: 0; }").is_empty());
    }

    #[test]
    fn at_statements_count() {
        let findings = check(".a {\n  @extend %b; color: red;\n}");
        assert_eq!(findings.len(), 1);
    }
}
