use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_rules;
use crate::syntax::Item;

pub const DEPTH_ID: &str = "nesting-depth";
pub const SPAN_ID: &str = "nesting-span";

/// Selector nesting goes no deeper than `max_depth` levels.
///
/// Only selector blocks count towards the depth; `@media` and other block
/// at-rules are transparent. Once a block is reported its descendants are not,
/// so one over-nested branch yields one finding.
#[derive(Debug)]
pub struct NestingDepthRule {
    severity: Severity,
    max_depth: usize,
}

impl NestingDepthRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
            max_depth: config.max_depth,
        })
    }
}

impl Rule for NestingDepthRule {
    fn id(&self) -> &str {
        DEPTH_ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        // Each entry is a block still being read and the depth of its children.
        let mut pending = vec![(ctx.stylesheet.items.iter(), 0usize)];
        while let Some((siblings, depth)) = pending.last_mut() {
            let depth = *depth;
            let Some(item) = siblings.next() else {
                pending.pop();
                continue;
            };
            let Item::Rule(rule) = item else { continue };
            if !rule.is_selector_rule() {
                pending.push((rule.items.iter(), depth));
                continue;
            }
            if depth > self.max_depth {
                findings.push(
                    ctx.finding(
                        self,
                        rule.start,
                        format!(
                            "selector is nested {} levels deep (max {})",
                            depth, self.max_depth
                        ),
                    )
                    .with_suggest("flatten the selector or move it to the top level"),
                );
                continue;
            }
            pending.push((rule.items.iter(), depth + 1));
        }
        findings
    }
}

/// A nested selector block spans at most `max_lines` source lines.
#[derive(Debug)]
pub struct NestingSpanRule {
    severity: Severity,
    max_lines: usize,
}

impl NestingSpanRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        if config.max_lines == 0 {
            return Err(RuleBuildError::InvalidValue {
                id: config.id.clone(),
                field: "max_lines",
                reason: "must be at least 1".into(),
            });
        }
        Ok(Self {
            severity: config.severity,
            max_lines: config.max_lines,
        })
    }
}

impl Rule for NestingSpanRule {
    fn id(&self) -> &str {
        SPAN_ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_rules(
            &ctx.stylesheet.items,
            &mut |rule, ancestors| {
                if !rule.is_selector_rule() || !ancestors.iter().any(|a| a.is_selector_rule()) {
                    return;
                }
                let span = rule.end_line() - rule.start.line + 1;
                if span > self.max_lines {
                    findings.push(
                        ctx.finding(
                            self,
                            rule.start,
                            format!(
                                "nested block spans {} lines (max {})",
                                span, self.max_lines
                            ),
                        )
                        .with_suggest("split the block or move it to the top level"),
                    );
                }
            },
        );
        findings
    }
}
