use crate::syntax::ast::{
    finish_block, AtStatement, CommentNode, CommentStyle, Declaration, Item, Prelude, RuleNode,
    Selector, Stylesheet, Value,
};
use crate::syntax::token::{Position, Token, TokenKind, Unterminated};

/// A recoverable syntax problem found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub message: String,
    pub position: Position,
}

/// Result of [`parse`]: the tree plus every recoverable problem met on the way.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub stylesheet: Stylesheet,
    pub issues: Vec<ParseIssue>,
}

/// Build a [`Stylesheet`] from tokens. Never fails; malformed input is
/// recorded in [`Parsed::issues`].
///
/// Open blocks are kept on an explicit stack, so nesting depth is limited
/// only by memory.
pub fn parse(tokens: &[Token]) -> Parsed {
    let mut parser = Parser {
        tokens,
        pos: 0,
        issues: Vec::new(),
    };
    let items = parser.items();
    Parsed {
        stylesheet: Stylesheet { items },
        issues: parser.issues,
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    issues: Vec<ParseIssue>,
}

/// What an open block turns into once it is closed.
enum Opener {
    Root,
    Rule {
        prelude: Prelude,
        start: Position,
        leading_blank_lines: usize,
    },
    /// A block with no usable header. Its body is parsed and dropped.
    Discard,
}

/// A block whose body is being collected.
struct Frame {
    opener: Opener,
    open_brace: Position,
    items: Vec<Item>,
    /// Line breaks seen since the last item.
    newlines: usize,
    /// Whether the last pushed item is a line comment run that may continue.
    open_run: bool,
}

impl Frame {
    fn new(opener: Opener, open_brace: Position, newlines: usize) -> Self {
        Self {
            opener,
            open_brace,
            items: Vec::new(),
            newlines,
            open_run: false,
        }
    }

    /// The item just pushed (or skipped) ends any blank-line or comment run.
    fn settle(&mut self) {
        self.newlines = 0;
        self.open_run = false;
    }
}

/// A parsed at-rule header.
enum AtRuleHead {
    /// Followed by `{`, which has been consumed.
    Block {
        prelude: Prelude,
        start: Position,
        open_brace: Position,
    },
    Statement(AtStatement),
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn issue(&mut self, position: Position, message: impl Into<String>) {
        self.issues.push(ParseIssue {
            message: message.into(),
            position,
        });
    }

    /// Index of the first non-trivia token at or after `from`.
    fn significant_from(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_trivia())
    }

    fn end_of_input(&self) -> Position {
        self.tokens.last().map_or(Position::new(1, 1, 0), |t| t.end)
    }

    /// Parse the whole token stream. `current` collects the innermost open
    /// block; its ancestors wait on `open`.
    fn items(&mut self) -> Vec<Item> {
        // At the top of the file the first line counts as preceded by a line break.
        let mut current = Frame::new(Opener::Root, Position::new(1, 1, 0), 1);
        let mut open: Vec<Frame> = Vec::new();

        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Whitespace => self.pos += 1,
                TokenKind::Newline => {
                    current.newlines += 1;
                    self.pos += 1;
                }
                TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::Unterminated(Unterminated::Comment) => {
                    self.pos += 1;
                    if tok.kind == TokenKind::Unterminated(Unterminated::Comment) {
                        self.issue(tok.start, "unterminated comment");
                    }
                    push_comment(&mut current, tok);
                }
                TokenKind::CloseBrace => {
                    self.pos += 1;
                    match open.pop() {
                        Some(parent) => {
                            let block = std::mem::replace(&mut current, parent);
                            current.items.extend(self.close(block, Some(tok)));
                        }
                        None => self.issue(tok.start, "unexpected '}' without matching '{'"),
                    }
                }
                TokenKind::Unterminated(Unterminated::Brace)
                | TokenKind::Semicolon
                | TokenKind::Value
                | TokenKind::Comma => self.pos += 1,
                TokenKind::OpenBrace => {
                    self.issue(tok.start, "block without a selector");
                    self.pos += 1;
                    // The body is still parsed so its structure stays consistent.
                    enter(&mut current, &mut open, Opener::Discard, tok.start);
                }
                TokenKind::SelectorText => {
                    let leading_blank_lines = current.newlines.saturating_sub(1);
                    match self.rule_head() {
                        Some((selectors, open_brace)) => {
                            let opener = match selectors.first().map(|s| s.start) {
                                Some(start) => Opener::Rule {
                                    start,
                                    prelude: Prelude::Selectors(selectors),
                                    leading_blank_lines,
                                },
                                None => Opener::Discard,
                            };
                            enter(&mut current, &mut open, opener, open_brace);
                        }
                        None => current.settle(),
                    }
                }
                TokenKind::Property | TokenKind::Colon => {
                    let mut decl = self.declaration();
                    decl.leading_blank_lines = current.newlines.saturating_sub(1);
                    current.items.push(Item::Declaration(decl));
                    current.settle();
                }
                TokenKind::AtKeyword => {
                    let leading_blank_lines = current.newlines.saturating_sub(1);
                    match self.at_rule_head() {
                        AtRuleHead::Block {
                            prelude,
                            start,
                            open_brace,
                        } => {
                            let opener = Opener::Rule {
                                prelude,
                                start,
                                leading_blank_lines,
                            };
                            enter(&mut current, &mut open, opener, open_brace);
                        }
                        AtRuleHead::Statement(mut statement) => {
                            statement.leading_blank_lines = leading_blank_lines;
                            current.items.push(Item::AtStatement(statement));
                            current.settle();
                        }
                    }
                }
            }
        }

        while let Some(parent) = open.pop() {
            let block = std::mem::replace(&mut current, parent);
            current.items.extend(self.close(block, None));
        }
        finish_block(&mut current.items);
        current.items
    }

    /// Finish a block at its `}` (or at end of input when `close` is `None`)
    /// and build the item it stands for.
    fn close(&mut self, mut block: Frame, close: Option<&Token>) -> Option<Item> {
        finish_block(&mut block.items);
        let (close_brace, end) = match close {
            Some(tok) => (Some(tok.start), tok.end),
            None => {
                self.issue(block.open_brace, "unclosed block: missing '}'");
                (None, self.end_of_input())
            }
        };
        match block.opener {
            Opener::Rule {
                prelude,
                start,
                leading_blank_lines,
            } => Some(Item::Rule(RuleNode {
                prelude,
                start,
                open_brace: block.open_brace,
                close_brace,
                end,
                leading_blank_lines,
                items: block.items,
            })),
            Opener::Root | Opener::Discard => None,
        }
    }

    /// Collect a selector list up to and including its `{`. Returns `None`
    /// (with an issue) when no `{` follows.
    fn rule_head(&mut self) -> Option<(Vec<Selector>, Position)> {
        let mut selectors: Vec<Selector> = Vec::new();
        let mut current: Option<Selector> = None;

        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::SelectorText => {
                    match &mut current {
                        Some(sel) => {
                            sel.text.push(' ');
                            sel.text.push_str(&tok.text);
                        }
                        None => {
                            current = Some(Selector {
                                text: tok.text.clone(),
                                start: tok.start,
                            })
                        }
                    }
                    self.pos += 1;
                }
                TokenKind::Comma | TokenKind::OpenBrace => {
                    match current.take() {
                        Some(sel) => selectors.push(sel),
                        None => self.issue(tok.start, "empty selector in selector list"),
                    }
                    self.pos += 1;
                    if tok.kind == TokenKind::OpenBrace {
                        return Some((selectors, tok.start));
                    }
                }
                kind if kind.is_trivia() => self.pos += 1,
                _ => break,
            }
        }

        let at = self.peek().map_or_else(|| self.end_of_input(), |t| t.start);
        self.issue(at, "expected '{' after selector");
        None
    }

    fn declaration(&mut self) -> Declaration {
        let tokens = self.tokens;
        let first = &tokens[self.pos];
        let start = first.start;
        let mut end = first.end;
        let mut property = String::new();
        if first.kind == TokenKind::Property {
            property = first.text.clone();
            self.pos += 1;
        } else {
            self.issue(start, "declaration is missing a property name");
        }

        let mut value = None;
        let mut semicolon = None;

        match self.significant_from(self.pos) {
            Some(idx) if tokens[idx].kind == TokenKind::Colon => {
                let colon = &tokens[idx];
                end = colon.end;
                self.pos = idx + 1;
                match self.value_tokens() {
                    Some((v, value_end)) => {
                        end = value_end;
                        value = Some(v);
                    }
                    None => self.issue(colon.start, format!("declaration '{}' is missing a value", property)),
                }
            }
            _ => {
                self.issue(start, format!("expected ':' in declaration '{}'", property));
            }
        }

        if let Some(idx) = self.significant_from(self.pos) {
            let tok = &tokens[idx];
            if tok.kind == TokenKind::Semicolon {
                semicolon = Some(tok.start);
                end = tok.end;
                self.pos = idx + 1;
            }
        }

        Declaration {
            property,
            value,
            start,
            end,
            semicolon,
            is_last: false,
            trailing_comment: None,
            leading_blank_lines: 0,
        }
    }

    /// Collect a run of value tokens (values, commas and the trivia between
    /// them). Leaves the cursor just past the last value or comma token.
    fn value_tokens(&mut self) -> Option<(Value, Position)> {
        let tokens = self.tokens;
        let mut first: Option<usize> = None;
        let mut last = 0;
        let mut idx = self.pos;
        while let Some(tok) = tokens.get(idx) {
            match tok.kind {
                TokenKind::Value | TokenKind::Comma => {
                    first.get_or_insert(idx);
                    last = idx;
                }
                kind if kind.is_trivia() => {}
                _ => break,
            }
            idx += 1;
        }
        let first = first?;
        self.pos = last + 1;

        let slice = &tokens[first..=last];
        let raw: String = slice.iter().map(|t| t.text.as_str()).collect();
        let mut parts = Vec::new();
        let mut part = String::new();
        for tok in slice {
            match tok.kind {
                TokenKind::Comma => parts.push(std::mem::take(&mut part).trim().to_string()),
                kind if kind.is_comment() => {}
                _ => part.push_str(&tok.text),
            }
        }
        parts.push(part.trim().to_string());

        Some((
            Value {
                raw,
                start: slice[0].start,
                parts,
            },
            slice[slice.len() - 1].end,
        ))
    }

    fn at_rule_head(&mut self) -> AtRuleHead {
        let tokens = self.tokens;
        let keyword = &tokens[self.pos];
        self.pos += 1;
        let name = keyword.text.trim_start_matches('@').to_string();
        if name.is_empty() {
            self.issue(keyword.start, "'@' without an at-rule name");
        }

        let (params, params_start, mut end) = match self.value_tokens() {
            Some((v, end)) => {
                let lead = v.raw.len() - v.raw.trim_start().len();
                (v.raw.trim().to_string(), Some(v.position_at(lead)), end)
            }
            None => (String::new(), None, keyword.end),
        };

        let mut semicolon = None;
        if let Some(idx) = self.significant_from(self.pos) {
            let tok = &tokens[idx];
            match tok.kind {
                TokenKind::OpenBrace => {
                    self.pos = idx + 1;
                    return AtRuleHead::Block {
                        prelude: Prelude::AtRule {
                            name,
                            params,
                            params_start,
                        },
                        start: keyword.start,
                        open_brace: tok.start,
                    };
                }
                TokenKind::Semicolon => {
                    self.pos = idx + 1;
                    semicolon = Some(tok.start);
                    end = tok.end;
                }
                _ => {}
            }
        }

        AtRuleHead::Statement(AtStatement {
            name,
            params,
            params_start,
            start: keyword.start,
            end,
            semicolon,
            is_last: false,
            trailing_comment: None,
            leading_blank_lines: 0,
        })
    }
}

/// Make a new block the current one. The enclosing block waits on `open`.
fn enter(current: &mut Frame, open: &mut Vec<Frame>, opener: Opener, open_brace: Position) {
    current.settle();
    let parent = std::mem::replace(current, Frame::new(opener, open_brace, 0));
    open.push(parent);
}

/// Add a comment to the block: attached to the statement before it on the
/// same line, appended to a running `//` comment on the previous line, or as
/// an item of its own.
fn push_comment(block: &mut Frame, tok: &Token) {
    if block.newlines == 0 && attach_trailing(&mut block.items, &tok.text) {
        return;
    }
    let is_line = tok.kind == TokenKind::LineComment;
    if is_line && block.open_run && block.newlines == 1 {
        if let Some(Item::Comment(run)) = block.items.last_mut() {
            run.text.push('\n');
            run.text.push_str(&tok.text);
            run.end = tok.end;
            block.newlines = 0;
            return;
        }
    }
    block.items.push(Item::Comment(CommentNode {
        style: if is_line {
            CommentStyle::LineRun
        } else {
            CommentStyle::Block
        },
        text: tok.text.clone(),
        start: tok.start,
        end: tok.end,
        leading_blank_lines: block.newlines.saturating_sub(1),
        attached_to: None,
    }));
    block.open_run = is_line;
    block.newlines = 0;
}

/// Attach a comment on the same line as the preceding statement to it.
fn attach_trailing(items: &mut [Item], text: &str) -> bool {
    let slot = match items.last_mut() {
        Some(Item::Declaration(d)) => &mut d.trailing_comment,
        Some(Item::AtStatement(a)) => &mut a.trailing_comment,
        _ => return false,
    };
    if slot.is_some() {
        return false;
    }
    *slot = Some(text.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokenize;

    fn parse_str(source: &str) -> Parsed {
        parse(&tokenize(source))
    }

    fn first_rule(parsed: &Parsed) -> &RuleNode {
        parsed
            .stylesheet
            .items
            .iter()
            .find_map(|i| match i {
                Item::Rule(r) => Some(r),
                _ => None,
            })
            .expect("no rule parsed")
    }

    #[test]
    fn parses_selectors_and_declarations() {
        let parsed = parse_str(".a,\n.b {\n  color: #fff;\n  margin: 0 auto;\n}");
        assert!(parsed.issues.is_empty());
        let rule = first_rule(&parsed);
        let selectors: Vec<_> = rule.selectors().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(selectors, vec![".a", ".b"]);
        assert_eq!(rule.selectors()[1].start.line, 2);

        let decls: Vec<_> = rule.declarations().collect();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property, "color");
        assert_eq!(decls[0].value.as_ref().unwrap().raw, "#fff");
        assert!(!decls[0].is_last);
        assert!(decls[1].is_last);
        assert!(decls[1].semicolon.is_some());
        assert_eq!(rule.close_brace.unwrap().column, 1);
    }

    #[test]
    fn nested_rules_are_owned_by_parent() {
        let parsed = parse_str(".a {\n  .b {\n    .c {}\n  }\n}");
        let a = first_rule(&parsed);
        let b = a.rules().next().unwrap();
        let c = b.rules().next().unwrap();
        assert_eq!(b.selectors()[0].text, ".b");
        assert_eq!(c.selectors()[0].text, ".c");
        assert_eq!(c.start.line, 3);
    }

    #[test]
    fn value_parts_split_on_commas() {
        let parsed = parse_str(".a { font-family: \"Helvetica Neue\", Arial,sans-serif; }");
        let decl = first_rule(&parsed).declarations().next().unwrap();
        let value = decl.value.as_ref().unwrap();
        assert_eq!(value.parts, vec!["\"Helvetica Neue\"", "Arial", "sans-serif"]);
        assert_eq!(value.raw, "\"Helvetica Neue\", Arial,sans-serif");
    }

    #[test]
    fn missing_semicolon_on_last_declaration() {
        let parsed = parse_str(".a{color:#FFFFFF}");
        let decl = first_rule(&parsed).declarations().next().unwrap();
        assert!(decl.is_last);
        assert!(decl.semicolon.is_none());
    }

    #[test]
    fn malformed_declaration_is_kept() {
        let parsed = parse_str(".a {\n  color red;\n  margin:;\n}");
        let decls: Vec<_> = first_rule(&parsed).declarations().collect();
        assert_eq!(decls.len(), 2);
        assert!(decls.iter().all(|d| d.is_malformed()));
        assert_eq!(parsed.issues.len(), 2);
        assert!(parsed.issues[0].message.contains("expected ':'"));
        assert!(parsed.issues[1].message.contains("missing a value"));
    }

    #[test]
    fn comment_attaches_to_following_rule() {
        let parsed = parse_str("/* Buttons */\n.btn {}\n");
        match &parsed.stylesheet.items[0] {
            Item::Comment(c) => {
                assert_eq!(c.style, CommentStyle::Block);
                assert_eq!(c.attached_to, Some(1));
            }
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn comment_after_two_blank_lines_is_unattached() {
        let parsed = parse_str(".a {}\n\n\n// Section\n// continued\n\n\n.b {}\n");
        match &parsed.stylesheet.items[1] {
            Item::Comment(c) => {
                assert_eq!(c.style, CommentStyle::LineRun);
                assert_eq!(c.text, "// Section\n// continued");
                assert_eq!(c.leading_blank_lines, 2);
                assert_eq!(c.attached_to, None);
            }
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn comment_at_end_of_file_is_unattached() {
        let parsed = parse_str(".a {}\n/* end */");
        match &parsed.stylesheet.items[1] {
            Item::Comment(c) => assert_eq!(c.attached_to, None),
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn trailing_comment_on_declaration() {
        let parsed = parse_str(".a {\n  color: red; // brand\n}");
        let rule = first_rule(&parsed);
        assert_eq!(rule.items.len(), 1);
        let decl = rule.declarations().next().unwrap();
        assert_eq!(decl.trailing_comment.as_deref(), Some("// brand"));
    }

    #[test]
    fn leading_blank_lines_are_counted() {
        let parsed = parse_str(".a {}\n\n.b {}\n.c {}");
        let blanks: Vec<_> = parsed
            .stylesheet
            .items
            .iter()
            .map(|i| i.leading_blank_lines())
            .collect();
        assert_eq!(blanks, vec![0, 1, 0]);
    }

    #[test]
    fn at_rules_with_and_without_blocks() {
        let parsed = parse_str(".a {\n  @extend %b;\n  @include c(1px, 2px);\n  @media print {\n    color: red;\n  }\n}");
        let rule = first_rule(&parsed);
        match &rule.items[0] {
            Item::AtStatement(a) => {
                assert_eq!(a.name, "extend");
                assert_eq!(a.params, "%b");
                assert!(a.semicolon.is_some());
            }
            other => panic!("expected @extend, got {:?}", other),
        }
        match &rule.items[1] {
            Item::AtStatement(a) => assert_eq!(a.params, "c(1px, 2px)"),
            other => panic!("expected @include, got {:?}", other),
        }
        let media = rule.rules().next().unwrap();
        assert_eq!(media.at_rule_name(), Some("media"));
        assert_eq!(media.declarations().count(), 1);
    }

    #[test]
    fn unclosed_block_is_reported() {
        let parsed = parse_str(".a {\n  color: red;\n");
        assert_eq!(parsed.issues.len(), 1);
        assert!(parsed.issues[0].message.contains("unclosed block"));
        assert_eq!(parsed.issues[0].position.line, 1);
        assert!(first_rule(&parsed).close_brace.is_none());
    }

    #[test]
    fn unclosed_nested_blocks_report_innermost_first() {
        let parsed = parse_str(".a {\n  .b {\n    color: red;\n");
        let lines: Vec<_> = parsed.issues.iter().map(|i| i.position.line).collect();
        assert_eq!(lines, vec![2, 1]);
        let a = first_rule(&parsed);
        assert_eq!(a.rules().next().unwrap().declarations().count(), 1);
    }

    #[test]
    fn deep_nesting_needs_no_call_stack() {
        let depth = 100_000;
        let source = format!("{}{}", ".a {\n".repeat(depth), "}\n".repeat(depth));
        let levels = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let parsed = parse_str(&source);
                assert!(parsed.issues.is_empty());
                let mut levels = 0;
                let mut items = &parsed.stylesheet.items;
                while let Some(Item::Rule(rule)) = items.first() {
                    levels += 1;
                    items = &rule.items;
                }
                levels
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(levels, depth);
    }

    #[test]
    fn at_rule_params_start_after_the_keyword() {
        let parsed = parse_str("@media  screen {\n}\n@include x(1px);");
        match &parsed.stylesheet.items[0] {
            Item::Rule(rule) => match &rule.prelude {
                Prelude::AtRule { params_start, .. } => {
                    assert_eq!(params_start.map(|p| p.column), Some(9));
                }
                other => panic!("expected at-rule, got {:?}", other),
            },
            other => panic!("expected rule, got {:?}", other),
        }
        match &parsed.stylesheet.items[1] {
            Item::AtStatement(a) => assert_eq!(a.params_start.map(|p| p.column), Some(10)),
            other => panic!("expected @include, got {:?}", other),
        }
    }

    #[test]
    fn stray_close_brace_is_reported() {
        let parsed = parse_str(".a {}\n}");
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].position.line, 2);
    }

    #[test]
    fn unterminated_comment_is_reported() {
        let parsed = parse_str(".a {}\n/* never closed");
        assert_eq!(parsed.issues.len(), 1);
        assert!(parsed.issues[0].message.contains("unterminated comment"));
    }

    #[test]
    fn empty_selector_in_list() {
        let parsed = parse_str(".a,, .b {}");
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(first_rule(&parsed).selectors().len(), 2);
    }
}
