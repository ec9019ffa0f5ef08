//! Error kinds for smarty-peek operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// The resolver branches on this to decide whether a candidate file is
/// skipped quietly (`FileNotFound`) or skipped with a warning (`SyntaxError`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration file or option values
    ConfigInvalid,

    /// Invalid argument passed to a function
    InvalidArgument,

    // =========================================================================
    // Parse errors
    // =========================================================================
    /// The parser produced no tree at all
    ParseFailed,

    /// Source file is not syntactically valid
    SyntaxError,

    /// Source is not valid UTF-8
    EncodingError,

    /// Tree-sitter grammar could not be loaded
    GrammarError,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// Candidate file does not exist
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    /// Directory traversal failed
    TraversalFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Errors that mean "the source is broken", as opposed to "the source is absent".
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            ErrorKind::ParseFailed | ErrorKind::SyntaxError | ErrorKind::EncodingError
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::SyntaxError.to_string(), "SyntaxError");
        assert_eq!(ErrorKind::FileNotFound.as_str(), "FileNotFound");
    }

    #[test]
    fn test_classification() {
        assert!(ErrorKind::SyntaxError.is_parse_failure());
        assert!(ErrorKind::EncodingError.is_parse_failure());
        assert!(!ErrorKind::FileNotFound.is_parse_failure());
    }
}
