//! Common types and utilities shared by both conversion directions.

// Submodule declarations
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, Severity, TracingSink};
pub use error::{Error, ErrorKind, Result};
