use std::fmt;

/// A location in the source text.
///
/// `line` and `column` are 1-based, `column` counts characters (so a tab is
/// one column). `offset` is the 0-based byte offset into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Position of `text[..byte_idx]` when `text` starts at `self`.
    ///
    /// `\n`, `\r\n` and a lone `\r` each end a line.
    pub fn advance(self, text: &str, byte_idx: usize) -> Self {
        let mut pos = self;
        for (i, ch) in text[..byte_idx].char_indices() {
            let breaks = ch == '\n' || (ch == '\r' && text.as_bytes().get(i + 1) != Some(&b'\n'));
            if breaks {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
            pos.offset += ch.len_utf8();
        }
        pos
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What an unterminated marker token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unterminated {
    /// A `/*` with no closing `*/`. The token text runs to end of input.
    Comment,
    /// End of input reached with open blocks. Zero-width, at end of input.
    Brace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One selector of a selector list, without surrounding whitespace.
    SelectorText,
    OpenBrace,
    CloseBrace,
    /// Declaration property name, or the whole text of a declaration with no `:`.
    Property,
    /// A comma-free stretch of a declaration value or at-rule prelude.
    Value,
    Colon,
    Semicolon,
    Comma,
    /// `// ...` up to (not including) the line break.
    LineComment,
    /// `/* ... */`.
    BlockComment,
    /// `@name` of an at-rule.
    AtKeyword,
    /// Run of spaces and tabs, kept verbatim.
    Whitespace,
    /// A single `\n` or `\r\n`.
    Newline,
    Unterminated(Unterminated),
}

impl TokenKind {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::Unterminated(Unterminated::Comment)
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::Unterminated(Unterminated::Comment)
        )
    }
}

/// A lexical token. `text` is the exact source slice it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Index of the nearest non-trivia token before `idx`.
pub fn prev_significant(tokens: &[Token], idx: usize) -> Option<usize> {
    (0..idx).rev().find(|&i| !tokens[i].kind.is_trivia())
}

/// Index of the nearest non-trivia token after `idx`.
pub fn next_significant(tokens: &[Token], idx: usize) -> Option<usize> {
    (idx + 1..tokens.len()).find(|&i| !tokens[i].kind.is_trivia())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_counts_characters_and_lines() {
        let start = Position::new(3, 5, 10);
        let pos = start.advance("ab\n\tcé", 7);
        assert_eq!(pos.line, 4);
        assert_eq!(pos.column, 4);
        assert_eq!(pos.offset, 17);
    }

    #[test]
    fn lone_carriage_return_ends_a_line() {
        let pos = Position::new(1, 1, 0).advance("a\rb", 3);
        assert_eq!((pos.line, pos.column), (2, 2));

        let crlf = Position::new(1, 1, 0).advance("a\r\nb", 4);
        assert_eq!((crlf.line, crlf.column), (2, 2));

        // A `\r` cut off from its `\n` is not a break on its own.
        let split = Position::new(1, 1, 0).advance("a\r\n", 2);
        assert_eq!((split.line, split.column), (1, 3));
    }

    #[test]
    fn display_is_line_colon_column() {
        assert_eq!(Position::new(2, 7, 0).to_string(), "2:7");
    }
}
