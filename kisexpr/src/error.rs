//! Errors for file-level operations.
use crate::parser::ParseError;

/// Error returned when loading or saving documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The text is not a well-formed s-expression document.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Reading or writing the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The document was not loaded from a file and has no path to save to.
    #[error("document has no path to save to")]
    NoPath,
}
