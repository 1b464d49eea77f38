//! The error taxonomy of the library.

use citrine_parser::ScanError;
use thiserror::Error;

/// Any error that the library can produce.
///
/// Each variant renders as a single line carrying the error class, the reason
/// and, for parse errors, the source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input is not a valid YAML document.
    ///
    /// Carries the offending line and column and a short reason.
    #[error("parse error: {0}")]
    Parse(#[from] ScanError),

    /// A node was accessed as a kind it does not have.
    #[error("type error: expected {expected}, found {found}")]
    Type {
        /// The kind that the operation required.
        expected: &'static str,
        /// The kind the node actually has.
        found: &'static str,
    },

    /// An index, key or numeric coercion fell outside the valid range.
    #[error("out of range error: {0}")]
    OutOfRange(String),

    /// A precondition unrelated to types or ranges was violated.
    #[error("error: {0}")]
    Domain(String),
}

/// A convenience alias for operations that may fail with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
