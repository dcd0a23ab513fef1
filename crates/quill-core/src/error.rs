use std::{collections::TryReserveError, io, path::Path, result::Result as StdResult};

use thiserror::Error;

/// Result type for quill operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type. Every variant is fatal to the editing session: the
/// control loop restores the terminal and hands the error to the caller.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("io: {0}")]
    /// File read or write failure.
    Io(String),
    #[error("terminal: {0}")]
    /// Terminal mode, size or byte I/O failure.
    Terminal(String),
    #[error("allocation failed: {0}")]
    /// A line buffer could not be allocated or grown.
    Alloc(#[from] TryReserveError),
    #[error("render: {0}")]
    /// A frame could not be written to the terminal.
    Render(String),
}

impl Error {
    /// Wrap an I/O error that occurred while touching the file at `path`.
    pub fn file(path: &Path, e: &io::Error) -> Self {
        Self::Io(format!("{}: {e}", path.display()))
    }
}
