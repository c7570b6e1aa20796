//! # geoslim Cloud
//!
//! Download a remote ZIP archive and unpack it into a local directory.
//!
//! The archive is held in memory while it downloads, then extracted into a
//! staging directory beside the destination and moved into place, so a
//! failed fetch leaves nothing behind.
//!
//! ## Features
//!
//! - `native` (default): blocking API via tokio `block_on`

pub mod archive;
pub mod error;
pub mod fetcher;
pub mod http;

#[cfg(feature = "native")]
pub mod sync_api;

pub use archive::{extract_archive, extract_archive_file, extract_archive_with_limit};
pub use error::{FetchError, Result};
pub use fetcher::{find_layer_in, ArchiveFetcher, FetchOptions, FetchedArchive};

/// Blocking API re-exported as `blocking` module (native only).
#[cfg(feature = "native")]
pub mod blocking {
    pub use crate::sync_api::*;
}
