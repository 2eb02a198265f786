//! Unified error types for the converter.
//!
//! Every failure surfaced by either conversion direction is one of four
//! closed kinds: structural, lexical, semantic (unsupported) or argument.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, ErrorKind, Result};
