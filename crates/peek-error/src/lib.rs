//! # peek-error
//!
//! Unified error handling for smarty-peek.
//!
//! - **ErrorKind**: what went wrong (e.g. `FileNotFound`, `SyntaxError`)
//! - **Context**: which file, which line, which operation
//! - **Source**: the wrapped underlying error, never leaked as a raw type
//!
//! ## Usage
//!
//! ```rust
//! use peek_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::syntax_error_at("unexpected `)`", 12)
//!         .with_operation("php::parse")
//!         .with_context("file", "src/Controller.php"))
//! }
//!
//! let err = example().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::SyntaxError);
//! assert_eq!(err.line(), Some(12));
//! ```
//!
//! Failures inside the resolver are recovered locally: a missing or broken
//! candidate file is logged and skipped. These types exist so the skip can be
//! decided on `ErrorKind` instead of on message strings.

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using the smarty-peek Error
pub type Result<T> = std::result::Result<T, Error>;
