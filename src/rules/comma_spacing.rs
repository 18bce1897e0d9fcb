use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::token::prev_significant;
use crate::syntax::{Token, TokenKind};

pub const ID: &str = "comma-spacing";

/// Commas in property values and function arguments are followed by exactly
/// one space and preceded by none. A line break after the comma is accepted
/// for multi-line lists.
#[derive(Debug)]
pub struct CommaSpacingRule {
    severity: Severity,
}

impl CommaSpacingRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for CommaSpacingRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let tokens = ctx.tokens;
        let mut findings = Vec::new();

        for (idx, tok) in tokens.iter().enumerate() {
            if tok.kind != TokenKind::Comma {
                continue;
            }
            // Value commas follow a value (or an empty list item after another comma).
            let in_value = prev_significant(tokens, idx).map_or(false, |p| {
                matches!(
                    tokens[p].kind,
                    TokenKind::Value | TokenKind::Colon | TokenKind::AtKeyword
                ) || (tokens[p].kind == TokenKind::Comma && is_value_comma(tokens, p))
            });
            if !in_value {
                continue;
            }

            if idx > 0 && tokens[idx - 1].kind == TokenKind::Whitespace {
                findings.push(
                    ctx.finding(self, tokens[idx - 1].start, "unexpected space before ','")
                        .with_suggest("remove the space before the comma"),
                );
            }

            match tokens.get(idx + 1) {
                Some(next) if next.kind == TokenKind::Newline => {}
                Some(next) if next.kind == TokenKind::Whitespace => {
                    if next.text != " "
                        && !matches!(tokens.get(idx + 2), Some(t) if t.kind == TokenKind::Newline)
                    {
                        findings.push(
                            ctx.finding(
                                self,
                                tok.start,
                                format!("expected one space after ',', found {:?}", next.text),
                            )
                            .with_suggest("use exactly one space after the comma"),
                        );
                    }
                }
                Some(next) if !matches!(next.kind, TokenKind::Semicolon | TokenKind::CloseBrace) => {
                    findings.push(
                        ctx.finding(self, tok.start, "expected one space after ','")
                            .with_suggest("add a space after the comma"),
                    );
                }
                _ => {}
            }
        }

        findings
    }
}

fn is_value_comma(tokens: &[Token], idx: usize) -> bool {
    let mut i = idx;
    while let Some(p) = prev_significant(tokens, i) {
        match tokens[p].kind {
            TokenKind::Comma => i = p,
            TokenKind::Value | TokenKind::Colon | TokenKind::AtKeyword => return true,
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::lint;

    fn check(content: &str) -> Vec<Finding> {
        let rule = CommaSpacingRule::new(&RuleConfig::default()).unwrap();
        lint(&rule, content)
    }

    #[test]
    fn single_space_passes() {
        assert!(check(".a {\n  color: rgba(0, 0, 0, .5);\n  font-family: Arial, sans-serif;\n}").is_empty());
    }

    #[test]
    fn missing_space() {
        let findings = check(".a {\n  color: rgba(0,0,0,.5);\n}");
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].column, Some(16));
    }

    #[test]
    fn too_many_spaces() {
        let findings = check(".a { font-family: Arial,   serif; }");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("found"));
    }

    #[test]
    fn space_before_comma() {
        let findings = check(".a { font-family: Arial , serif; }");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("before"));
    }

    #[test]
    fn line_break_after_comma_is_allowed() {
        let content = ".a {\n  box-shadow:\n    0 0 1px red,\n    0 1px 2px blue;\n}";
        assert!(check(content).is_empty());
    }

    #[test]
    fn selector_commas_are_not_checked() {
        assert!(check(".a,.b {}").is_empty());
    }

    #[test]
    fn include_arguments_are_checked() {
        assert_eq!(check(".a {\n  @include size(1px,2px);\n}").len(), 1);
    }
}
