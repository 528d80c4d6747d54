//! Error types for mdreport library.

use std::io;
use thiserror::Error;

/// Result type alias for mdreport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during a conversion.
///
/// Only collaborator failures (the Markdown parser and the sanitizer) abort a
/// conversion. Malformed input is repaired or degraded and never reaches here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The Markdown parser failed.
    #[error("rendering failed: {0}")]
    Render(String),

    /// The HTML sanitizer failed.
    #[error("rendering failed: sanitizer: {0}")]
    Sanitize(String),

    /// The configuration could not be read.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Reasons a single table is left unformatted.
///
/// These never abort a conversion; the table formatter logs them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The table has no `<tr>` at all.
    #[error("table has no rows")]
    NoRows,

    /// The first row has no cells.
    #[error("table header has no cells")]
    NoColumns,

    /// The table structure could not be interpreted.
    #[error("inconsistent table: {0}")]
    Inconsistent(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Render("parser panicked".to_string());
        assert_eq!(err.to_string(), "rendering failed: parser panicked");

        let err = Error::Sanitize("bad tree".to_string());
        assert_eq!(err.to_string(), "rendering failed: sanitizer: bad tree");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
