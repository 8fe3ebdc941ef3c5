//! # Manuscript Parser
//!
//! Tokenizer and recursive-descent parser for the Manuscript markup
//! language, a restricted LaTeX-like syntax.
//!
//! ## Pipeline position
//!
//! ```text
//! markup text → parser (this crate) → AST → compiler → document tree
//! ```
//!
//! The parser produces a transient [`ast::AstNode`] tree: plain text runs,
//! paragraph breaks, `\name[opts]{...}` tags, `\begin{...}...\end{...}`
//! environments, bracket groups and `$...$` inline maths. The AST carries no
//! identity or ownership; those belong to the document tree built by the
//! compiler.
//!
//! ## Grammar notes
//!
//! - Tab, newline and carriage-return characters between tokens are
//!   skipped; spaces are significant. A blank line becomes a `Break`.
//! - `)`, `]` and `}` terminate the innermost open scope regardless of
//!   which opener started it. A closer with no open scope is an
//!   `UnmatchedDelimiter` error.
//! - Recursion depth is bounded by input nesting depth; pathologically
//!   nested input can exhaust the stack. This is a documented limit.

pub mod ast;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use ast::AstNode;
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Parse a complete markup document into an AST
pub fn parse(source: &str) -> ParseResult<Vec<AstNode>> {
    Parser::new(source)?.parse_document()
}
