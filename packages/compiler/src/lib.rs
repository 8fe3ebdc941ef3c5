//! # Manuscript Compiler
//!
//! Compiles the parsed markup AST into a populated Article document tree.
//!
//! ## Behavior
//!
//! The top level of a document is a preamble (`documentclass`,
//! `usepackage`, `title`, `author`, `date`) followed by exactly one
//! `document` environment. The environment body is walked with a pending
//! text accumulator, a pending paragraph and an optional open
//! section/subsection; blank lines split paragraphs, sections collect what
//! follows them.
//!
//! ## Error boundaries
//!
//! Structural problems — an unknown top-level tag, a wrong document class,
//! a malformed argument, an environment that is not `document` — abort the
//! whole compilation; no partial article is returned. Unrecognized tags
//! inside the body are the one recoverable case: they are logged through
//! `tracing` and skipped, so documents using newer markup still compile.

mod compiler;
pub mod error;

pub use compiler::{compile, compile_source};
pub use error::{CompileError, CompileResult};
