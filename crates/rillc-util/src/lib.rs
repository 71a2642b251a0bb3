//! Core utilities and foundation types shared by the lexer, parser, and
//! evaluator: source spans, string interning, and diagnostic reporting.
//!
//! Nothing in this crate knows about the language's grammar or runtime
//! values; it only supplies the plumbing every other crate builds on.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level, SourceSnippet};
pub use error::{DiagnosticError, SourceMapError, SymbolError};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
