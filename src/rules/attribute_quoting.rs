use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::TokenKind;
use regex::Regex;

pub const ID: &str = "attribute-selector-quoting";

/// Attribute selector values are always quoted: `[type="checkbox"]`.
#[derive(Debug)]
pub struct AttributeQuotingRule {
    severity: Severity,
    attribute: Regex,
}

impl AttributeQuotingRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        let attribute = Regex::new(
            r#"\[\s*([^\]\s~|^$*="']+)\s*([~|^$*]?=)\s*([^\]\s"']+)(\s+[iIsS])?\s*\]"#,
        )
        .map_err(|e| RuleBuildError::InvalidRegex(config.id.clone(), e))?;
        Ok(Self {
            severity: config.severity,
            attribute,
        })
    }
}

impl Rule for AttributeQuotingRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for tok in ctx.tokens.iter().filter(|t| t.kind == TokenKind::SelectorText) {
            for caps in self.attribute.captures_iter(&tok.text) {
                let (Some(name), Some(op), Some(value)) = (caps.get(1), caps.get(2), caps.get(3))
                else {
                    continue;
                };
                // Sass interpolation produces the quotes at compile time.
                if value.as_str().contains("#{") {
                    continue;
                }
                let fixed = format!("[{}{}\"{}\"]", name.as_str(), op.as_str(), value.as_str());
                findings.push(
                    ctx.finding(
                        self,
                        tok.start.advance(&tok.text, value.start()),
                        format!(
                            "attribute selector value '{}' should be quoted",
                            value.as_str()
                        ),
                    )
                    .with_suggest(fixed),
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
        let rule = AttributeQuotingRule::new(&RuleConfig::default()).unwrap();
        lint(&rule, content)
    }

    #[test]
    fn quoted_value_passes() {
        assert!(check("input[type=\"checkbox\"] {}").is_empty());
        assert!(check("input[type='checkbox'] {}").is_empty());
        assert!(check("[disabled] {}").is_empty());
    }

    #[test]
    fn unquoted_value() {
        let findings = check("input[type=checkbox]{}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].column, Some(12));
        assert!(findings[0].message.contains("checkbox"));
        assert_eq!(findings[0].suggest.as_deref(), Some("[type=\"checkbox\"]"));
    }

    #[test]
    fn operators_and_flags() {
        assert_eq!(check("a[href^=http] {}").len(), 1);
        assert_eq!(check("a[lang|=en i] {}").len(), 1);
        assert!(check("a[lang|=\"en\" i] {}").is_empty());
    }

    #[test]
    fn every_attribute_in_a_list() {
        let findings = check("[a=b],\n[c=d] {}");
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[1].line, Some(2));
    }
}
