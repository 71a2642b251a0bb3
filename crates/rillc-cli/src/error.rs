//! Error handling for the `rill` CLI.
//!
//! This module provides the CLI's own error type, used for configuration
//! and I/O failures at the command-dispatch boundary. Parse and evaluation
//! errors are rendered directly as diagnostics (see `commands::diagnostics`)
//! rather than converted into this type, since they already carry richer
//! source context than a string message would preserve.

use thiserror::Error;

/// Errors raised by the `rill` CLI outside of the interpreter pipeline
/// itself.
#[derive(Error, Debug)]
pub enum CliError {
    /// Error when a required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error when file operations fail.
    #[error("file operation failed: {0}")]
    FileOperation(String),

    /// Source contains parse errors; the diagnostics have already been
    /// emitted to the handler by the time this is raised.
    #[error("{0} parse error(s)")]
    ParseFailed(usize),

    /// Evaluation raised a runtime error; already emitted to the handler.
    #[error("evaluation failed")]
    EvalFailed,

    /// Error when IO operations fail.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError`.
pub type Result<T> = std::result::Result<T, CliError>;
