//! Stylesheet syntax: tokens, the parsed tree, and the two stages that
//! produce them.

pub mod ast;
pub mod parser;
pub mod token;
pub mod tokenizer;

pub use ast::{
    AtStatement, CommentNode, CommentStyle, Declaration, Item, Prelude, RuleNode, Selector,
    Stylesheet, Value,
};
pub use parser::{parse, ParseIssue, Parsed};
pub use token::{Position, Token, TokenKind, Unterminated};
pub use tokenizer::tokenize;
