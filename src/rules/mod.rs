pub mod attribute_quoting;
pub mod blank_lines;
pub mod brace_spacing;
pub mod class_naming;
pub mod closing_brace;
pub mod comma_spacing;
pub mod compact_form;
pub mod declaration_per_line;
pub mod directive_order;
pub mod factory;
pub mod function_namespace;
pub mod heading_comment;
pub mod hex_color;
pub mod indentation;
pub mod nesting;
pub mod quote_style;
pub mod selector_per_line;
pub mod trailing_semicolon;
pub mod zero_unit;

use crate::config::Severity;
use crate::syntax::ast::walk_blocks;
use crate::syntax::{Item, Position, Prelude, Stylesheet, Token};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Finding id for recoverable syntax problems reported by the parser.
pub const PARSE_ERROR: &str = "parse-error";
/// Finding id for files that could not be read or decoded.
pub const IO_ERROR: &str = "io-error";
/// Finding id for a check that panicked.
pub const INTERNAL_ERROR: &str = "internal-error";

/// A style check over one parsed stylesheet.
///
/// Checks are pure: the same context always yields the same findings, and no
/// check depends on another having run.
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule (e.g. `"brace-spacing"`).
    fn id(&self) -> &str;

    /// Severity level reported when the rule fires.
    fn severity(&self) -> Severity;

    /// Inspect the file and return any findings.
    fn check(&self, ctx: &LintContext) -> Vec<Finding>;
}

/// The file currently being linted, in every stage of its pipeline.
pub struct LintContext<'a> {
    pub file_path: &'a Path,
    pub source: &'a str,
    pub tokens: &'a [Token],
    pub stylesheet: &'a Stylesheet,
}

impl<'a> LintContext<'a> {
    /// Text of the line containing `at`, without its line break. `\n`,
    /// `\r\n` and a lone `\r` all end a line.
    pub fn source_line(&self, at: Position) -> Option<&'a str> {
        let source = self.source;
        let offset = at.offset.min(source.len());
        if !source.is_char_boundary(offset) {
            return None;
        }
        let is_break = |c: char| c == '\n' || c == '\r';
        let start = source[..offset].rfind(is_break).map_or(0, |i| i + 1);
        let end = source[offset..].find(is_break).map_or(source.len(), |i| offset + i);
        Some(&source[start..end])
    }

    /// A finding for `rule` at `at`, with the offending source line attached.
    pub fn finding(&self, rule: &dyn Rule, at: Position, message: impl Into<String>) -> Finding {
        Finding {
            rule_id: rule.id().to_string(),
            severity: rule.severity(),
            file: self.file_path.to_path_buf(),
            line: Some(at.line),
            column: Some(at.column),
            message: message.into(),
            suggest: None,
            source_line: self.source_line(at).map(str::to_string),
        }
    }
}

/// A single reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(rename = "rule")]
    pub rule_id: String,
    pub severity: Severity,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
    /// Descriptive fix; never applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest: Option<String>,
    #[serde(skip)]
    pub source_line: Option<String>,
}

impl Finding {
    /// A finding about the file as a whole, with no line or column.
    pub fn file_level(
        rule_id: &str,
        severity: Severity,
        file: &Path,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            file: file.to_path_buf(),
            line: None,
            column: None,
            message: message.into(),
            suggest: None,
            source_line: None,
        }
    }

    pub fn with_suggest(mut self, suggest: impl Into<String>) -> Self {
        self.suggest = Some(suggest.into());
        self
    }
}

/// Errors that can occur when constructing a rule from config.
#[derive(Debug, Error)]
pub enum RuleBuildError {
    #[error("rule '{0}': invalid regex: {1}")]
    InvalidRegex(String, regex::Error),
    #[error("rule '{0}': missing required field '{1}'")]
    MissingField(String, &'static str),
    #[error("rule '{id}': invalid value for '{field}': {reason}")]
    InvalidValue {
        id: String,
        field: &'static str,
        reason: String,
    },
}

/// At-rules whose parameters are queries, names, selectors or URLs rather
/// than values.
pub(crate) const NON_VALUE_AT_RULES: &[&str] = &[
    "at-root", "charset", "container", "counter-style", "extend", "font-feature-values",
    "forward", "import", "keyframes", "layer", "media", "namespace", "page", "property",
    "supports", "use",
];

/// A stretch of value text: a declaration value or the parameters of an
/// at-rule that takes values (`@include`, `@return`, `@if`, ...).
pub(crate) struct ValueText<'a> {
    pub text: &'a str,
    pub start: Position,
    /// Property name, or `@name` for at-rule parameters.
    pub owner: String,
}

impl ValueText<'_> {
    pub fn position_at(&self, idx: usize) -> Position {
        self.start.advance(self.text, idx)
    }
}

fn takes_values(at_rule: &str) -> bool {
    !NON_VALUE_AT_RULES.contains(&at_rule.to_ascii_lowercase().as_str())
}

/// Every value text in the stylesheet, in source order.
pub(crate) fn value_texts(sheet: &Stylesheet) -> Vec<ValueText<'_>> {
    let mut out = Vec::new();
    walk_blocks(sheet, &mut |_, items| {
        for item in items {
            let found = match item {
                Item::Declaration(d) => d.value.as_ref().map(|v| ValueText {
                    text: &v.raw,
                    start: v.start,
                    owner: d.property.clone(),
                }),
                Item::AtStatement(a) => a
                    .params_start
                    .filter(|_| takes_values(&a.name))
                    .map(|start| ValueText {
                        text: &a.params,
                        start,
                        owner: format!("@{}", a.name),
                    }),
                Item::Rule(rule) => match &rule.prelude {
                    Prelude::AtRule {
                        name,
                        params,
                        params_start: Some(start),
                    } if takes_values(name) => Some(ValueText {
                        text: params,
                        start: *start,
                        owner: format!("@{}", name),
                    }),
                    _ => None,
                },
                Item::Comment(_) => None,
            };
            out.extend(found);
        }
    });
    out.sort_by_key(|v| v.start.offset);
    out
}

/// Byte offsets of every string literal in `text`, as
/// `(start, end, quote)` with `end` just past the closing quote.
pub(crate) fn string_literals(text: &str) -> Vec<(usize, usize, u8)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            q @ (b'"' | b'\'') => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i = (i + 1).min(bytes.len());
                found.push((start, i, q));
            }
            _ => i += 1,
        }
    }
    found
}

/// Whether byte `idx` falls inside one of `spans`.
pub(crate) fn in_spans(spans: &[(usize, usize, u8)], idx: usize) -> bool {
    spans.iter().any(|&(s, e, _)| idx >= s && idx < e)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::syntax::{parse, tokenize};

    /// Run one rule over `source` through the full tokenize/parse pipeline.
    pub fn lint(rule: &dyn Rule, source: &str) -> Vec<Finding> {
        let tokens = tokenize(source);
        let parsed = parse(&tokens);
        let ctx = LintContext {
            file_path: Path::new("test.scss"),
            source,
            tokens: &tokens,
            stylesheet: &parsed.stylesheet,
        };
        rule.check(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literals_respect_escapes() {
        let spans = string_literals(r#"a "b\"c" 'd' e"#);
        assert_eq!(spans, vec![(2, 8, b'"'), (9, 12, b'\'')]);
    }

    #[test]
    fn value_texts_cover_declarations_and_directive_arguments() {
        let source = "@use \"sass:math\";\n@media (min-width: 0px) {\n  .a {\n    color: red;\n    @include button(#FFF, 0px);\n  }\n}\n@each $c in #000, #111 {\n  .b { color: $c; }\n}\n";
        let parsed = crate::syntax::parse(&crate::syntax::tokenize(source));
        let texts: Vec<_> = value_texts(&parsed.stylesheet)
            .iter()
            .map(|v| (v.owner.clone(), v.text.to_string(), v.start.line))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("color".to_string(), "red".to_string(), 4),
                ("@include".to_string(), "button(#FFF, 0px)".to_string(), 5),
                ("@each".to_string(), "$c in #000, #111".to_string(), 8),
                ("color".to_string(), "$c".to_string(), 9),
            ]
        );
    }

    #[test]
    fn source_line_follows_any_line_break() {
        let source = ".a {\r  color: red;\r\n}\n";
        let tokens = crate::syntax::tokenize(source);
        let parsed = crate::syntax::parse(&tokens);
        let ctx = LintContext {
            file_path: Path::new("a.css"),
            source,
            tokens: &tokens,
            stylesheet: &parsed.stylesheet,
        };
        let decl = crate::syntax::ast::all_declarations(&parsed.stylesheet)[0];
        assert_eq!(decl.start.line, 2);
        assert_eq!(ctx.source_line(decl.start), Some("  color: red;"));
        assert_eq!(ctx.source_line(Position::new(3, 1, source.len() - 2)), Some("}"));
    }

    #[test]
    fn finding_serializes_with_rule_key() {
        let finding = Finding::file_level(IO_ERROR, Severity::Error, Path::new("a.css"), "boom");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["rule"], "io-error");
        assert_eq!(json["severity"], "error");
        assert!(json["line"].is_null());
        assert!(json.get("suggest").is_none());
    }
}
