use crate::syntax::token::Position;

/// A parsed stylesheet. Items appear in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub items: Vec<Item>,
}

/// One entry in a stylesheet or block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Rule(RuleNode),
    Declaration(Declaration),
    /// An at-rule without a block, e.g. `@extend %x;` or `@import "a";`.
    AtStatement(AtStatement),
    Comment(CommentNode),
}

impl Item {
    pub fn start(&self) -> Position {
        match self {
            Item::Rule(r) => r.start,
            Item::Declaration(d) => d.start,
            Item::AtStatement(a) => a.start,
            Item::Comment(c) => c.start,
        }
    }

    pub fn end(&self) -> Position {
        match self {
            Item::Rule(r) => r.end,
            Item::Declaration(d) => d.end,
            Item::AtStatement(a) => a.end,
            Item::Comment(c) => c.end,
        }
    }

    /// Number of blank lines between this item and whatever precedes it.
    pub fn leading_blank_lines(&self) -> usize {
        match self {
            Item::Rule(r) => r.leading_blank_lines,
            Item::Declaration(d) => d.leading_blank_lines,
            Item::AtStatement(a) => a.leading_blank_lines,
            Item::Comment(c) => c.leading_blank_lines,
        }
    }

    /// Declarations and block-less at-rules.
    pub fn is_statement(&self) -> bool {
        matches!(self, Item::Declaration(_) | Item::AtStatement(_))
    }
}

/// What opens a rule block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prelude {
    /// A selector list. Never empty.
    Selectors(Vec<Selector>),
    /// A block at-rule such as `@media screen` or `@include x { ... }`.
    AtRule {
        name: String,
        params: String,
        params_start: Option<Position>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub text: String,
    pub start: Position,
}

/// A rule block with its selectors (or at-rule header) and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    pub prelude: Prelude,
    /// First character of the first selector, or the `@` of an at-rule.
    pub start: Position,
    pub open_brace: Position,
    /// `None` when the block is never closed.
    pub close_brace: Option<Position>,
    pub end: Position,
    pub leading_blank_lines: usize,
    pub items: Vec<Item>,
}

impl RuleNode {
    pub fn selectors(&self) -> &[Selector] {
        match &self.prelude {
            Prelude::Selectors(s) => s,
            Prelude::AtRule { .. } => &[],
        }
    }

    pub fn is_selector_rule(&self) -> bool {
        matches!(self.prelude, Prelude::Selectors(_))
    }

    pub fn at_rule_name(&self) -> Option<&str> {
        match &self.prelude {
            Prelude::AtRule { name, .. } => Some(name),
            Prelude::Selectors(_) => None,
        }
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.items.iter().filter_map(|item| match item {
            Item::Declaration(d) => Some(d),
            _ => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &RuleNode> {
        self.items.iter().filter_map(|item| match item {
            Item::Rule(r) => Some(r),
            _ => None,
        })
    }

    /// Opening and closing brace on the same line (`.a { color: red; }`).
    pub fn is_single_line(&self) -> bool {
        self.close_brace
            .map_or(false, |close| close.line == self.open_brace.line)
    }

    pub fn end_line(&self) -> usize {
        self.close_brace.map_or(self.end.line, |c| c.line)
    }
}

impl Drop for RuleNode {
    // Unnests children before they drop so deep trees do not recurse.
    fn drop(&mut self) {
        let mut doomed = std::mem::take(&mut self.items);
        while let Some(item) = doomed.pop() {
            if let Item::Rule(mut rule) = item {
                doomed.append(&mut rule.items);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// `None` for malformed declarations (no `:` or nothing after it).
    pub value: Option<Value>,
    pub start: Position,
    pub end: Position,
    pub semicolon: Option<Position>,
    /// Last statement of its block.
    pub is_last: bool,
    /// Comment on the same line after the declaration.
    pub trailing_comment: Option<String>,
    pub leading_blank_lines: usize,
}

impl Declaration {
    pub fn line(&self) -> usize {
        self.start.line
    }

    pub fn is_malformed(&self) -> bool {
        self.value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub raw: String,
    pub start: Position,
    /// Top-level comma-separated parts, trimmed.
    pub parts: Vec<String>,
}

impl Value {
    /// Source position of the byte at `idx` within `raw`.
    pub fn position_at(&self, idx: usize) -> Position {
        self.start.advance(&self.raw, idx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtStatement {
    /// Keyword without the `@`.
    pub name: String,
    pub params: String,
    pub params_start: Option<Position>,
    pub start: Position,
    pub end: Position,
    pub semicolon: Option<Position>,
    pub is_last: bool,
    pub trailing_comment: Option<String>,
    pub leading_blank_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// One or more `//` comments on consecutive lines.
    LineRun,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub style: CommentStyle,
    pub text: String,
    pub start: Position,
    pub end: Position,
    pub leading_blank_lines: usize,
    /// Index of the sibling item this comment describes, if any.
    pub attached_to: Option<usize>,
}

/// Visit every rule in source order together with its ancestors
/// (outermost first).
///
/// The walk keeps its own stack rather than recursing, so arbitrarily deep
/// nesting is safe.
pub fn walk_rules<'a, F>(items: &'a [Item], f: &mut F)
where
    F: FnMut(&'a RuleNode, &[&'a RuleNode]),
{
    let mut ancestors: Vec<&'a RuleNode> = Vec::new();
    let mut pending = vec![items.iter()];
    while let Some(siblings) = pending.last_mut() {
        match siblings.next() {
            Some(Item::Rule(rule)) => {
                f(rule, &ancestors);
                ancestors.push(rule);
                pending.push(rule.items.iter());
            }
            Some(_) => {}
            None => {
                pending.pop();
                ancestors.pop();
            }
        }
    }
}

/// Visit every item list (the stylesheet itself, then each block body) in
/// source order. The rule is `None` for the top level.
pub fn walk_blocks<'a, F>(sheet: &'a Stylesheet, f: &mut F)
where
    F: FnMut(Option<&'a RuleNode>, &'a [Item]),
{
    f(None, &sheet.items);
    walk_rules(&sheet.items, &mut |rule, _| f(Some(rule), &rule.items));
}

/// Every declaration in the stylesheet, in source order.
pub fn all_declarations(sheet: &Stylesheet) -> Vec<&Declaration> {
    let mut out = Vec::new();
    walk_blocks(sheet, &mut |_, items| {
        out.extend(items.iter().filter_map(|item| match item {
            Item::Declaration(d) => Some(d),
            _ => None,
        }));
    });
    out.sort_by_key(|d| d.start.offset);
    out
}

/// Mark the last statement of a block and link comments to the item they
/// describe: the next sibling, when the comment is not preceded by two or
/// more blank lines and at most one blank line separates it from that sibling.
pub(crate) fn finish_block(items: &mut [Item]) {
    if let Some(last) = items.iter_mut().rev().find(|i| i.is_statement()) {
        match last {
            Item::Declaration(d) => d.is_last = true,
            Item::AtStatement(a) => a.is_last = true,
            _ => {}
        }
    }

    for idx in 0..items.len() {
        let next_blank = match items.get(idx + 1) {
            Some(Item::Comment(_)) | None => continue,
            Some(next) => next.leading_blank_lines(),
        };
        if let Item::Comment(comment) = &mut items[idx] {
            if comment.leading_blank_lines < 2 && next_blank <= 1 {
                comment.attached_to = Some(idx + 1);
            }
        }
    }
}
