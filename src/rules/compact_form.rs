use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_rules;
use crate::syntax::Item;

pub const ID: &str = "compact-form-eligibility";

/// Single-line blocks (`.a { color: red; }`) may hold only a few declarations.
#[derive(Debug)]
pub struct CompactFormRule {
    severity: Severity,
    max_declarations: usize,
}

impl CompactFormRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        if config.max_declarations == 0 {
            return Err(RuleBuildError::InvalidValue {
                id: config.id.clone(),
                field: "max_declarations",
                reason: "must be at least 1".into(),
            });
        }
        Ok(Self {
            severity: config.severity,
            max_declarations: config.max_declarations,
        })
    }
}

impl Rule for CompactFormRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_rules(&ctx.stylesheet.items, &mut |rule, _| {
            if !rule.is_single_line() {
                return;
            }
            let count = rule.items.iter().filter(|i| i.is_statement()).count();
            let has_nested = rule.items.iter().any(|i| matches!(i, Item::Rule(_)));
            if count > self.max_declarations || has_nested {
                let reason = if has_nested {
                    "contains a nested block".to_string()
                } else {
                    format!(
                        "has {} declarations (compact form allows at most {})",
                        count, self.max_declarations
                    )
                };
                findings.push(
                    ctx.finding(self, rule.open_brace, format!("single-line block {}", reason))
                        .with_suggest("expand the block to one declaration per line"),
                );
            }
        });
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::lint;

    fn check_with(content: &str, max: usize) -> Vec<Finding> {
        let config = RuleConfig {
            id: ID.into(),
            max_declarations: max,
            ..Default::default()
        };
        let rule = CompactFormRule::new(&config).unwrap();
        lint(&rule, content)
    }

    fn check(content: &str) -> Vec<Finding> {
        check_with(content, 3)
    }

    #[test]
    fn small_compact_block_passes() {
        assert!(check(".a { color: red; margin: 0; padding: 0; }").is_empty());
    }

    #[test]
    fn too_many_declarations() {
        let findings = check(".a { color: red; margin: 0; padding: 0; border: 0; }");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("4 declarations"));
    }

    #[test]
    fn multi_line_blocks_are_ignored() {
        let content = ".a {\n  a: 1;\n  b: 2;\n  c: 3;\n  d: 4;\n}";
        assert!(check(content).is_empty());
    }

    #[test]
    fn configurable_limit() {
        assert_eq!(check_with(".a { color: red; margin: 0; }", 1).len(), 1);
    }

    #[test]
    fn nested_block_on_one_line() {
        assert_eq!(check(".a { .b { color: red; } }").len(), 1);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let config = RuleConfig {
            id: ID.into(),
            max_declarations: 0,
            ..Default::default()
        };
        let err = CompactFormRule::new(&config).unwrap_err();
        assert!(matches!(err, RuleBuildError::InvalidValue { field: "max_declarations", .. }));
    }
}
