use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::token::prev_significant;
use crate::syntax::TokenKind;

pub const ID: &str = "brace-spacing";

/// Requires exactly one space between a selector (or at-rule prelude) and
/// its opening brace, on the same line.
#[derive(Debug)]
pub struct BraceSpacingRule {
    severity: Severity,
}

impl BraceSpacingRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for BraceSpacingRule {
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
            if tok.kind != TokenKind::OpenBrace {
                continue;
            }
            // Only braces that close a selector list or at-rule prelude.
            let Some(prev_idx) = prev_significant(tokens, idx) else {
                continue;
            };
            if !matches!(
                tokens[prev_idx].kind,
                TokenKind::SelectorText | TokenKind::Value | TokenKind::AtKeyword
            ) {
                continue;
            }

            let gap = &tokens[prev_idx + 1..idx];
            if gap.iter().any(|t| t.kind == TokenKind::Newline) {
                findings.push(
                    ctx.finding(self, tok.start, "opening brace should be on the same line as the selector")
                        .with_suggest("move '{' to the end of the selector line"),
                );
            } else if gap.is_empty() {
                findings.push(
                    ctx.finding(self, tok.start, "expected a single space before '{'")
                        .with_suggest("add one space before '{'"),
                );
            } else if gap.len() != 1 || gap[0].text != " " {
                findings.push(
                    ctx.finding(
                        self,
                        tok.start,
                        format!(
                            "expected a single space before '{{', found {:?}",
                            gap.iter().map(|t| t.text.as_str()).collect::<String>()
                        ),
                    )
                    .with_suggest("use exactly one space before '{'"),
                );
            }
        }

        findings
    }
}
