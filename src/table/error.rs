//! Error types for table parsing.

use thiserror::Error;

/// Errors raised while reading an uploaded table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The upload contains no header row.
    #[error("the file is empty")]
    Empty,

    /// Malformed delimited text (ragged rows, bad quoting, invalid UTF-8).
    #[error("malformed delimited text: {0}")]
    Parse(#[from] csv::Error),

    /// A header cell is blank or repeated.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The file name does not look like delimited text.
    #[error("unsupported file type {0:?}: expected .csv, .tsv or .txt")]
    UnsupportedFile(String),
}

/// Convenience result alias for table operations.
pub type TableResult<T> = Result<T, TableError>;
