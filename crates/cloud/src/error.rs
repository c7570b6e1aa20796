//! Error types for archive fetching.

use geoslim_core::Stage;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while downloading or unpacking an archive.
///
/// Every variant belongs to the fetch stage. None of them is retried.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("archive is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("archive expands to more than {limit} bytes")]
    ExtractedTooLarge { limit: u64 },

    #[error("not a valid ZIP archive: {0}")]
    InvalidArchive(String),

    #[error("archive entry '{name}' would be extracted outside the destination")]
    UnsafeEntry { name: String },

    #[error("no space left on device while writing {}", path.display())]
    InsufficientSpace { path: PathBuf },

    #[error("destination {} is not writable: {source}", path.display())]
    DestinationNotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("core error: {0}")]
    Core(#[from] geoslim_core::Error),
}

impl FetchError {
    pub fn stage(&self) -> Stage {
        Stage::Fetch
    }

    /// Classify a local write failure under `path`.
    pub(crate) fn from_write(path: impl Into<PathBuf>, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::StorageFull => FetchError::InsufficientSpace { path: path.into() },
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                FetchError::DestinationNotWritable {
                    path: path.into(),
                    source: e,
                }
            }
            _ => FetchError::Io(e),
        }
    }
}

impl From<zip::result::ZipError> for FetchError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => FetchError::Io(io),
            other => FetchError::InvalidArchive(other.to_string()),
        }
    }
}

/// Result alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
