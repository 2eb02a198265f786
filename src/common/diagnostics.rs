//! Error and warning reporting independent of the primary output.
//!
//! Converters never print. Anything that is worth telling the caller but
//! does not change the returned value is pushed into a [`DiagnosticSink`].

use super::error::{Error, ErrorKind};
use std::fmt;

/// How bad a reported problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Ignorable; the input was understood well enough
    Warning,
    /// Something was dropped but the conversion continues
    Error,
    /// The conversion was aborted
    Fatal,
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Error class
    pub code: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[inline]
    pub fn new(severity: Severity, code: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
        }
    }

    /// Ignorable warning.
    #[inline]
    pub fn warning(code: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Fatal diagnostic mirroring an error that aborted a conversion.
    #[inline]
    pub fn fatal(error: &Error) -> Self {
        Self::new(Severity::Fatal, error.kind(), error.detail())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({}): {}", self.severity, self.code, self.message)
    }
}

/// Receiver for diagnostics.
pub trait DiagnosticSink {
    /// Report a diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);

    /// Report an ignorable warning.
    fn warn(&mut self, code: ErrorKind, message: &str) {
        self.report(Diagnostic::warning(code, message));
    }
}

/// Collects every diagnostic in order.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => {
                tracing::warn!(code = %diagnostic.code, "{}", diagnostic.message)
            },
            Severity::Error | Severity::Fatal => {
                tracing::error!(
                    code = %diagnostic.code,
                    severity = ?diagnostic.severity,
                    "{}",
                    diagnostic.message
                )
            },
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.warn(ErrorKind::Semantic, "unknown attribute");
        sink.report(Diagnostic::fatal(&Error::Structural("missing }".into())));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].severity, Severity::Warning);
        assert_eq!(sink[1].severity, Severity::Fatal);
        assert_eq!(sink[1].code, ErrorKind::Structural);
        assert_eq!(sink[1].message, "missing }");
    }
}
