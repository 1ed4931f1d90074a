//! Error types for result file ingestion
//!
//! Row-level problems surface as [`ParseError`] so callers can report the
//! exact file, row and column. Everything above the reader (loader, charts,
//! CLI) works with `anyhow::Result`.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A result file could not be turned into typed records.
///
/// `row` is the 1-based line number inside the file; the header is line 1.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The header row has no column with this name
    #[error("{}: header has no '{column}' column", file.display())]
    MissingColumn { file: PathBuf, column: String },

    /// A required field is absent or empty
    #[error("{}: row {row}: missing value for column '{column}'", file.display())]
    MissingField {
        file: PathBuf,
        row: u64,
        column: String,
    },

    /// A field holds a value that does not parse as the expected number
    #[error("{}: row {row}: column '{column}': invalid value {value:?}", file.display())]
    InvalidField {
        file: PathBuf,
        row: u64,
        column: String,
        value: String,
    },

    /// The tabular layer itself could not read the file
    #[error("{}: malformed table", file.display())]
    Malformed {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ParseError {
    /// File the error was found in
    pub fn file(&self) -> &Path {
        match self {
            Self::MissingColumn { file, .. }
            | Self::MissingField { file, .. }
            | Self::InvalidField { file, .. }
            | Self::Malformed { file, .. } => file.as_path(),
        }
    }
}

/// Reading a single result file failed.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
