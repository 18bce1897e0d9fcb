use crate::config::{RuleConfig, Severity};
use crate::rules::{in_spans, string_literals, Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::ast::walk_rules;
use regex::Regex;

pub const ID: &str = "class-naming";

/// Block, optional `__element`, optional `--modifier`; lowercase words
/// joined by single hyphens.
pub const DEFAULT_PATTERN: &str =
    r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*(?:__[a-z0-9]+(?:-[a-z0-9]+)*)?(?:--[a-z0-9]+(?:-[a-z0-9]+)*)?$";

/// Every class in a selector matches a naming pattern (BEM by default).
#[derive(Debug)]
pub struct ClassNamingRule {
    severity: Severity,
    pattern: Regex,
    class: Regex,
}

impl ClassNamingRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        let source = config.pattern.as_deref().unwrap_or(DEFAULT_PATTERN);
        let pattern =
            Regex::new(source).map_err(|e| RuleBuildError::InvalidRegex(config.id.clone(), e))?;
        let class = Regex::new(r"\.(-?[_a-zA-Z][\w-]*)")
            .map_err(|e| RuleBuildError::InvalidRegex(config.id.clone(), e))?;
        Ok(Self {
            severity: config.severity,
            pattern,
            class,
        })
    }
}

impl Rule for ClassNamingRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        walk_rules(&ctx.stylesheet.items, &mut |rule, _| {
            for selector in rule.selectors() {
                // Interpolated names are only known after compilation.
                if selector.text.contains("#{") {
                    continue;
                }
                let strings = string_literals(&selector.text);
                for caps in self.class.captures_iter(&selector.text) {
                    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                        continue;
                    };
                    if in_spans(&strings, whole.start()) || self.pattern.is_match(name.as_str()) {
                        continue;
                    }
                    findings.push(
                        ctx.finding(
                            self,
                            selector.start.advance(&selector.text, whole.start()),
                            format!(
                                "class '{}' does not match the naming pattern",
                                name.as_str()
                            ),
                        )
                        .with_suggest(format!("rename to match {}", self.pattern.as_str())),
                    );
                }
            }
        });
        findings
    }
}
