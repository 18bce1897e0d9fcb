use crate::config::{QuoteStyle, RuleConfig, Severity};
use crate::rules::{string_literals, Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::TokenKind;

pub const ID: &str = "quote-style";

/// Strings and attribute selector values use the preferred quote character.
///
/// A string that contains the preferred quote is allowed to use the other one.
#[derive(Debug)]
pub struct QuoteStyleRule {
    severity: Severity,
    quote: QuoteStyle,
}

impl QuoteStyleRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
            quote: config.quote,
        })
    }
}

impl Rule for QuoteStyleRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let preferred = self.quote.quote_char();
        let (wanted, other) = match self.quote {
            QuoteStyle::Double => ("double", b'\''),
            QuoteStyle::Single => ("single", b'"'),
        };
        let mut findings = Vec::new();

        for tok in ctx.tokens {
            if !matches!(tok.kind, TokenKind::Value | TokenKind::SelectorText) {
                continue;
            }
            for (start, end, quote) in string_literals(&tok.text) {
                if quote != other {
                    continue;
                }
                let literal = &tok.text[start..end];
                let inner = literal
                    .get(1..literal.len().saturating_sub(1).max(1))
                    .unwrap_or("");
                if inner.contains(preferred) {
                    continue;
                }
                let fixed = format!("{}{}{}", preferred, inner, preferred);
                findings.push(
                    ctx.finding(
                        self,
                        tok.start.advance(&tok.text, start),
                        format!("string {} should use {} quotes", literal, wanted),
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

    fn check_with(content: &str, quote: QuoteStyle) -> Vec<Finding> {
        let config = RuleConfig {
            id: ID.into(),
            quote,
            ..Default::default()
        };
        let rule = QuoteStyleRule::new(&config).unwrap();
        lint(&rule, content)
    }

    fn check(content: &str) -> Vec<Finding> {
        check_with(content, QuoteStyle::Double)
    }

    #[test]
    fn double_quotes_pass() {
        assert!(check(".a {\n  content: \"x\";\n}\n[type=\"text\"] {}").is_empty());
    }

    #[test]
    fn single_quoted_value() {
        let findings = check(".a {\n  font-family: 'Helvetica Neue', serif;\n}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].column, Some(16));
        assert_eq!(findings[0].suggest.as_deref(), Some("\"Helvetica Neue\""));
    }

    #[test]
    fn single_quoted_attribute_value() {
        let findings = check("input[type='checkbox'] {}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].column, Some(12));
    }

    #[test]
    fn single_quotes_around_double_quote_are_allowed() {
        assert!(check(".a { content: 'say \"hi\"'; }").is_empty());
    }

    #[test]
    fn single_preference() {
        assert_eq!(check_with(".a { content: \"x\"; }", QuoteStyle::Single).len(), 1);
        assert!(check_with(".a { content: 'x'; }", QuoteStyle::Single).is_empty());
    }

    #[test]
    fn import_prelude_is_checked() {
        assert_eq!(check("@import 'base';").len(), 1);
    }

    #[test]
    fn comments_are_ignored() {
        assert!(check("// don't\n/* it's */\n.a {}").is_empty());
    }
}
