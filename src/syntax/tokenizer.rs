use crate::syntax::token::{Position, Token, TokenKind, Unterminated};

/// Split stylesheet text into tokens.
///
/// Never fails: unterminated comments and unclosed blocks become
/// [`TokenKind::Unterminated`] markers. Every byte of `source` is covered by
/// exactly one token, so concatenating token texts reproduces the input.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    lexer.run();
    lexer.finish()
}

/// Spaces and tabs (and the rarely seen form feed / vertical tab).
/// Line breaks are separate tokens.
pub(crate) fn is_inline_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0b' | '\x0c')
}

fn is_space(c: char) -> bool {
    is_inline_space(c) || c == '\n' || c == '\r'
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    spans: Vec<(TokenKind, usize, usize)>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            depth: 0,
            spans: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn byte_at(&self, idx: usize) -> Option<u8> {
        self.bytes.get(idx).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        if end > start || kind == TokenKind::Unterminated(Unterminated::Brace) {
            self.spans.push((kind, start, end));
        }
        self.pos = end;
    }

    fn single(&mut self, kind: TokenKind) {
        self.push(kind, self.pos, self.pos + 1);
    }

    fn run(&mut self) {
        loop {
            self.skip_trivia(true);
            let Some(b) = self.peek() else { break };
            match b {
                b'}' => {
                    self.single(TokenKind::CloseBrace);
                    self.depth = self.depth.saturating_sub(1);
                }
                b'{' => {
                    self.single(TokenKind::OpenBrace);
                    self.depth += 1;
                }
                b';' => self.single(TokenKind::Semicolon),
                b'@' => self.at_rule(),
                _ if self.starts_block() => self.selector_list(),
                _ => self.declaration(),
            }
        }
        if self.depth > 0 {
            let end = self.bytes.len();
            self.push(TokenKind::Unterminated(Unterminated::Brace), end, end);
        }
    }

    /// Emit whitespace, line breaks and comments at the cursor.
    fn skip_trivia(&mut self, line_comments: bool) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\x0b' | b'\x0c' => {
                    let start = self.pos;
                    let mut end = start;
                    while matches!(self.byte_at(end), Some(b' ' | b'\t' | b'\x0b' | b'\x0c')) {
                        end += 1;
                    }
                    self.push(TokenKind::Whitespace, start, end);
                }
                b'\r' if self.byte_at(self.pos + 1) == Some(b'\n') => {
                    self.push(TokenKind::Newline, self.pos, self.pos + 2);
                }
                b'\n' | b'\r' => self.single(TokenKind::Newline),
                b'/' if self.byte_at(self.pos + 1) == Some(b'*') => self.block_comment(),
                b'/' if line_comments && self.byte_at(self.pos + 1) == Some(b'/') => {
                    let start = self.pos;
                    let mut end = start;
                    while !matches!(self.byte_at(end), None | Some(b'\n' | b'\r')) {
                        end += 1;
                    }
                    self.push(TokenKind::LineComment, start, end);
                }
                _ => break,
            }
        }
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        match self.src[start + 2..].find("*/") {
            Some(rel) => self.push(TokenKind::BlockComment, start, start + 2 + rel + 2),
            None => self.push(
                TokenKind::Unterminated(Unterminated::Comment),
                start,
                self.bytes.len(),
            ),
        }
    }

    /// Index just past the string literal opening at `i`. Strings end at the
    /// matching quote, or before a line break when unterminated.
    fn skip_string(&self, i: usize) -> usize {
        let quote = self.bytes[i];
        let mut j = i + 1;
        while j < self.bytes.len() {
            match self.bytes[j] {
                b'\\' => j += 2,
                b'\n' | b'\r' => return j,
                b if b == quote => return j + 1,
                _ => j += 1,
            }
        }
        self.bytes.len()
    }

    /// Index just past a `#{...}` interpolation opening at `i`.
    fn skip_interpolation(&self, i: usize) -> usize {
        let mut depth = 0usize;
        let mut j = i + 1;
        while j < self.bytes.len() {
            match self.bytes[j] {
                b'"' | b'\'' => {
                    j = self.skip_string(j);
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return j + 1;
                    }
                }
                _ => {}
            }
            j += 1;
        }
        self.bytes.len()
    }

    fn is_interpolation(&self, i: usize) -> bool {
        self.bytes[i] == b'#' && self.byte_at(i + 1) == Some(b'{')
    }

    /// Whether the statement at the cursor opens a block (a selector list)
    /// rather than being a declaration.
    fn starts_block(&self) -> bool {
        let len = self.bytes.len();
        let mut parens = 0usize;
        let mut i = self.pos;
        while i < len {
            match self.bytes[i] {
                b'"' | b'\'' => {
                    i = self.skip_string(i);
                    continue;
                }
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'#' if self.is_interpolation(i) => {
                    i = self.skip_interpolation(i);
                    continue;
                }
                b'/' if self.byte_at(i + 1) == Some(b'*') => {
                    i = match self.src[i + 2..].find("*/") {
                        Some(rel) => i + 2 + rel + 2,
                        None => len,
                    };
                    continue;
                }
                b'/' if parens == 0 && self.byte_at(i + 1) == Some(b'/') => {
                    while i < len && self.bytes[i] != b'\n' {
                        i += 1;
                    }
                    continue;
                }
                b'(' | b'[' => parens += 1,
                b')' | b']' => parens = parens.saturating_sub(1),
                b'{' => return true,
                b'}' => return false,
                b';' if parens == 0 => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    fn selector_list(&mut self) {
        loop {
            self.skip_trivia(true);
            let Some(b) = self.peek() else { return };
            match b {
                b',' => {
                    self.single(TokenKind::Comma);
                    continue;
                }
                b'{' => {
                    self.single(TokenKind::OpenBrace);
                    self.depth += 1;
                    return;
                }
                b'}' | b';' => return,
                _ => {}
            }

            let start = self.pos;
            let mut parens = 0usize;
            let mut i = start;
            while i < self.bytes.len() {
                match self.bytes[i] {
                    b'"' | b'\'' => {
                        i = self.skip_string(i);
                        continue;
                    }
                    b'\\' => {
                        i += 2;
                        continue;
                    }
                    b'#' if self.is_interpolation(i) => {
                        i = self.skip_interpolation(i);
                        continue;
                    }
                    b'(' | b'[' => parens += 1,
                    b')' | b']' => parens = parens.saturating_sub(1),
                    b'{' | b'}' => break,
                    b',' | b';' if parens == 0 => break,
                    b'/' if parens == 0
                        && matches!(self.byte_at(i + 1), Some(b'*' | b'/')) =>
                    {
                        break
                    }
                    _ => {}
                }
                i += 1;
            }
            self.text_run(TokenKind::SelectorText, start, i);
        }
    }

    fn declaration(&mut self) {
        let start = self.pos;
        let mut parens = 0usize;
        let mut i = start;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' | b'\'' => {
                    i = self.skip_string(i);
                    continue;
                }
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'#' if self.is_interpolation(i) => {
                    i = self.skip_interpolation(i);
                    continue;
                }
                b'(' | b'[' => parens += 1,
                b')' | b']' => parens = parens.saturating_sub(1),
                b'{' | b'}' => break,
                b':' | b';' if parens == 0 => break,
                b'/' if parens == 0 && matches!(self.byte_at(i + 1), Some(b'*' | b'/')) => break,
                _ => {}
            }
            i += 1;
        }
        self.text_run(TokenKind::Property, start, i);

        self.skip_trivia(true);
        match self.peek() {
            Some(b':') => {
                self.single(TokenKind::Colon);
                self.value_list(false);
            }
            Some(b';') => self.single(TokenKind::Semicolon),
            _ => {}
        }
    }

    fn at_rule(&mut self) {
        let start = self.pos;
        let mut end = start + 1;
        while matches!(self.byte_at(end), Some(b) if b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            end += 1;
        }
        self.push(TokenKind::AtKeyword, start, end);
        self.value_list(true);
    }

    /// Comma-separated value text up to `;`, `}` or (for at-rules) `{`.
    fn value_list(&mut self, opens_block: bool) {
        let mut parens = 0usize;
        loop {
            self.skip_trivia(parens == 0);
            let Some(b) = self.peek() else { return };
            match b {
                b';' if parens == 0 => {
                    self.single(TokenKind::Semicolon);
                    return;
                }
                b'}' => return,
                b'{' => {
                    if opens_block {
                        self.single(TokenKind::OpenBrace);
                        self.depth += 1;
                    }
                    return;
                }
                b',' => {
                    self.single(TokenKind::Comma);
                    continue;
                }
                _ => {}
            }

            let start = self.pos;
            let mut i = start;
            while i < self.bytes.len() {
                match self.bytes[i] {
                    b'"' | b'\'' => {
                        i = self.skip_string(i);
                        continue;
                    }
                    b'\\' => {
                        i += 2;
                        continue;
                    }
                    b'#' if self.is_interpolation(i) => {
                        i = self.skip_interpolation(i);
                        continue;
                    }
                    b'(' => parens += 1,
                    b')' => parens = parens.saturating_sub(1),
                    b',' | b'{' | b'}' | b'\n' | b'\r' => break,
                    b';' if parens == 0 => break,
                    b'/' if self.byte_at(i + 1) == Some(b'*') => break,
                    b'/' if parens == 0 && self.byte_at(i + 1) == Some(b'/') => break,
                    _ => {}
                }
                i += 1;
            }
            self.text_run(TokenKind::Value, start, i);
        }
    }

    /// Emit `src[start..end]` minus trailing spaces as one token. The trailing
    /// spaces are left for the next trivia pass.
    fn text_run(&mut self, kind: TokenKind, start: usize, end: usize) {
        let end = end.min(self.bytes.len());
        let trimmed = self.src[start..end].trim_end_matches(is_space);
        self.push(kind, start, start + trimmed.len());
    }

    fn finish(self) -> Vec<Token> {
        let mut cursor = Position::new(1, 1, 0);
        let mut tokens = Vec::with_capacity(self.spans.len());
        for (kind, start, end) in self.spans {
            debug_assert_eq!(cursor.offset, start, "token spans must be contiguous");
            let text = &self.src[start..end];
            let end_pos = cursor.advance(text, text.len());
            tokens.push(Token {
                kind,
                text: text.to_string(),
                start: cursor,
                end: end_pos,
            });
            cursor = end_pos;
        }
        tokens
    }
}
