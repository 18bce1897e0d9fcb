use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_blocks;
use crate::syntax::Item;

pub const EXTEND_ID: &str = "extend-position";
pub const INCLUDE_ID: &str = "include-position";

fn directive(item: &Item) -> Option<&str> {
    match item {
        Item::AtStatement(a) => Some(a.name.as_str()),
        _ => None,
    }
}

/// `@extend` comes before anything else in its block.
#[derive(Debug)]
pub struct ExtendPositionRule {
    severity: Severity,
}

impl ExtendPositionRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for ExtendPositionRule {
    fn id(&self) -> &str {
        EXTEND_ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_blocks(ctx.stylesheet, &mut |rule, items| {
            if rule.is_none() {
                return;
            }
            // Index of the first non-comment item.
            let mut seen = 0usize;
            for item in items {
                if matches!(item, Item::Comment(_)) {
                    continue;
                }
                if directive(item) == Some("extend") && seen > 0 {
                    findings.push(
                        ctx.finding(self, item.start(), "@extend must be the first statement in its block")
                            .with_suggest("move @extend to the top of the block"),
                    );
                }
                seen += 1;
            }
        });
        findings
    }
}

/// `@include` without a content block comes before the block's own
/// declarations.
#[derive(Debug)]
pub struct IncludePositionRule {
    severity: Severity,
}

impl IncludePositionRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for IncludePositionRule {
    fn id(&self) -> &str {
        INCLUDE_ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_blocks(ctx.stylesheet, &mut |rule, items| {
            if rule.is_none() {
                return;
            }
            let mut first_declaration = None;
            for item in items {
                match item {
                    Item::Declaration(d) if first_declaration.is_none() => {
                        first_declaration = Some(d.property.clone());
                    }
                    Item::AtStatement(a) if a.name == "include" => {
                        if let Some(property) = &first_declaration {
                            findings.push(
                                ctx.finding(
                                    self,
                                    a.start,
                                    format!("@include appears after the declaration '{}'", property),
                                )
                                .with_suggest("place @include after @extend and before declarations"),
                            );
                        }
                    }
                    _ => {}
                }
            }
        });
        findings
    }
}
