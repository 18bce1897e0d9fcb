use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::{Token, TokenKind, Unterminated};

pub const ID: &str = "indentation-consistency";

/// Lines are indented with spaces only, `width` spaces per nesting level.
///
/// Every indented line is checked for tabs and for widths that are not a
/// multiple of the unit. Lines that begin a statement are also checked
/// against their brace depth; continuation lines (wrapped values, selector
/// lists) only need to be a multiple of the unit.
#[derive(Debug)]
pub struct IndentationRule {
    severity: Severity,
    width: usize,
}

impl IndentationRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        if config.indent_width == 0 {
            return Err(RuleBuildError::InvalidValue {
                id: config.id.clone(),
                field: "width",
                reason: "must be at least 1".into(),
            });
        }
        Ok(Self {
            severity: config.severity,
            width: config.indent_width,
        })
    }

    fn problem(&self, indent: &str, expected: Option<usize>) -> Option<(String, String)> {
        let has_tab = indent.contains('\t');
        if has_tab && indent.contains(' ') {
            return Some((
                "indentation mixes tabs and spaces".into(),
                "indent with spaces only".into(),
            ));
        }
        if has_tab {
            return Some((
                "tab character used for indentation".into(),
                format!("indent with {} spaces per level", self.width),
            ));
        }
        let found = indent.chars().count();
        if found % self.width != 0 {
            return Some((
                format!(
                    "indentation of {} spaces is not a multiple of {}",
                    found, self.width
                ),
                format!("indent with {} spaces per level", self.width),
            ));
        }
        match expected {
            Some(expected) if expected != found => Some((
                format!("expected {} spaces of indentation, found {}", expected, found),
                format!("indent by {} spaces", expected),
            )),
            _ => None,
        }
    }
}

/// Whether the token at `idx` begins a new statement: the previous
/// non-whitespace token closes one, or there is none.
fn starts_statement(tokens: &[Token], idx: usize) -> bool {
    let prev = tokens[..idx]
        .iter()
        .rev()
        .find(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Newline));
    match prev {
        None => true,
        Some(t) => matches!(
            t.kind,
            TokenKind::OpenBrace
                | TokenKind::CloseBrace
                | TokenKind::Semicolon
                | TokenKind::LineComment
                | TokenKind::BlockComment
        ),
    }
}

impl Rule for IndentationRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let tokens = ctx.tokens;
        let mut findings = Vec::new();
        let mut depth = 0usize;
        let mut line_start = true;

        for (idx, tok) in tokens.iter().enumerate() {
            if line_start {
                line_start = false;
                let (indent, content) = match tok.kind {
                    TokenKind::Whitespace => (tok.text.as_str(), idx + 1),
                    _ => ("", idx),
                };
                let blank = tokens.get(content).map_or(true, |t| {
                    matches!(
                        t.kind,
                        TokenKind::Newline | TokenKind::Unterminated(Unterminated::Brace)
                    )
                });
                if !blank {
                    let expected = starts_statement(tokens, content).then(|| {
                        let level = if tokens[content].kind == TokenKind::CloseBrace {
                            depth.saturating_sub(1)
                        } else {
                            depth
                        };
                        level * self.width
                    });
                    if let Some((message, suggest)) = self.problem(indent, expected) {
                        findings.push(ctx.finding(self, tok.start, message).with_suggest(suggest));
                    }
                }
            }

            match tok.kind {
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => depth = depth.saturating_sub(1),
                TokenKind::Newline => line_start = true,
                _ => {}
            }
        }

        findings
    }
}
