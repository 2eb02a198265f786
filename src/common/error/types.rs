//! Unified error types for the converter.
//!
//! Structural errors abort a conversion, lexical and semantic problems are
//! normally recovered from (and only reported through a
//! [`DiagnosticSink`](crate::common::diagnostics::DiagnosticSink)), and
//! argument errors are raised before any input is looked at.
use std::fmt;
use thiserror::Error;

/// Main error type for conversion operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unbalanced groups or elements, or a reference to a table entry
    /// that does not exist
    #[error("Structural error: {0}")]
    Structural(String),

    /// Malformed control word syntax or an invalid hex escape
    #[error("Lexical error: {0}")]
    Lexical(String),

    /// Content that is recognized as well-formed but not supported
    #[error("Unsupported content: {0}")]
    Unsupported(String),

    /// Invalid input handed to an entry point
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Classify the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Structural(_) => ErrorKind::Structural,
            Error::Lexical(_) => ErrorKind::Lexical,
            Error::Unsupported(_) => ErrorKind::Semantic,
            Error::InvalidArgument(_) => ErrorKind::Argument,
        }
    }

    /// Human-readable detail without the kind prefix.
    #[inline]
    pub fn detail(&self) -> &str {
        match self {
            Error::Structural(msg)
            | Error::Lexical(msg)
            | Error::Unsupported(msg)
            | Error::InvalidArgument(msg) => msg,
        }
    }

    /// Whether a conversion may continue after this error.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Lexical | ErrorKind::Semantic)
    }
}

/// The closed set of error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unbalanced groups, missing mandatory resources
    Structural,
    /// Malformed control words, invalid hex escapes
    Lexical,
    /// Unrecognized destinations or attributes, out-of-range values
    Semantic,
    /// Invalid input to an entry point
    Argument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Structural => "structural",
            ErrorKind::Lexical => "lexical",
            ErrorKind::Semantic => "semantic",
            ErrorKind::Argument => "argument",
        };
        f.write_str(name)
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
