//! Error types for folio operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening, reading, or extracting an EPUB
/// container.
///
/// Parsing-stage problems (missing metadata, malformed package documents)
/// never surface here; those paths degrade to empty defaults instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("archive not found: {0}")]
    NotFound(PathBuf),

    #[error("corrupt archive: {0}")]
    Corrupt(#[from] zip::result::ZipError),

    #[error("entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
