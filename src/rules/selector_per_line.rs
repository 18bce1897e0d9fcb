use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_rules;

pub const ID: &str = "one-selector-per-line";

/// Each selector in a comma-separated list goes on its own line.
#[derive(Debug)]
pub struct SelectorPerLineRule {
    severity: Severity,
}

impl SelectorPerLineRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for SelectorPerLineRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_rules(&ctx.stylesheet.items, &mut |rule, _| {
            for pair in rule.selectors().windows(2) {
                let (prev, sel) = (&pair[0], &pair[1]);
                if prev.start.line == sel.start.line {
                    findings.push(
                        ctx.finding(
                            self,
                            sel.start,
                            format!("selector '{}' shares a line with '{}'", sel.text, prev.text),
                        )
                        .with_suggest("put a line break after the comma"),
                    );
                }
            }
        });
        findings
    }
}
