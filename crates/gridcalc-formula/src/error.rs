//! Formula error types
//!
//! Structural and contract failures only. Spreadsheet-domain errors
//! (`#DIV/0!`, `#NAME?`, ...) are values, carried by
//! [`CompileResult`](crate::compiler::CompileResult), never `Err` variants.

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing or compiling a formula
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Malformed token stream: unbalanced parentheses, unclosed string, ...
    #[error("Invalid formula format: {0}")]
    Format(String),

    /// The tokenizer produced a token it could not classify
    #[error("Unrecognized token: {0}")]
    UnrecognizedToken(String),

    /// A token type that cannot start an expression reached the factory
    #[error("Unsupported token: {0}")]
    UnsupportedToken(String),

    /// Wrong number of arguments passed to a function
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Invalid argument to an engine operation
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Reference text that does not resolve to a cell or range
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Circular reference detected during dependency analysis
    #[error("Circular reference detected")]
    CircularReference,

    /// Error from the core address/value types
    #[error(transparent)]
    Core(#[from] gridcalc_core::Error),
}
