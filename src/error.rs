//! Error taxonomy shared by the catalog, the engine and the tag layer.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Path missing, unreadable or not stat-able.
    #[error("cannot access {path}: {reason}")]
    FileAccess { path: PathBuf, reason: String },

    /// Extension outside the configured audio set.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A required field (usually `full_path`) is missing.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced catalog key does not exist.
    #[error("no catalog entry for {0}")]
    NotFound(String),

    /// Backing store read/write failure.
    #[error("catalog store error at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Embedded tag read/write failure on a specific file.
    #[error("tag error on {path}: {reason}")]
    TagIo { path: PathBuf, reason: String },

    #[error("failed to launch player `{program}`: {source}")]
    PlayerLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn file_access(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FileAccess {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn tag_io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::TagIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
