use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_rules;

pub const ID: &str = "closing-brace-alignment";

/// A multi-line block's closing brace sits in the same column as the first
/// character of its selector.
#[derive(Debug)]
pub struct ClosingBraceRule {
    severity: Severity,
}

impl ClosingBraceRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for ClosingBraceRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_rules(&ctx.stylesheet.items, &mut |rule, _| {
            let Some(close) = rule.close_brace else { return };
            if rule.is_single_line() || close.column == rule.start.column {
                return;
            }
            findings.push(
                ctx.finding(
                    self,
                    close,
                    format!(
                        "closing brace is in column {}, but its block starts in column {}",
                        close.column, rule.start.column
                    ),
                )
                .with_suggest(format!("align '}}' with line {}", rule.start.line)),
            );
        });
        findings
    }
}
