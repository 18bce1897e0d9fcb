//! A style-conformance linter for CSS and SCSS.
//!
//! Each file goes through the same pipeline: [`syntax::tokenize`] produces a
//! lossless token stream, [`syntax::parse`] builds a tree from it, and the
//! [`engine::Engine`] runs every enabled [`rules::Rule`] over both. The
//! [`report::Report`] orders the findings and decides the exit code.

pub mod cli;
pub mod config;
pub mod engine;
pub mod report;
pub mod rules;
pub mod scan;
pub mod syntax;
