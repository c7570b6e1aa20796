//! Blocking (synchronous) API for native platforms.
//!
//! Wraps the async [`ArchiveFetcher`] with a Tokio runtime so callers don't
//! need to manage their own async runtime.

use std::path::Path;

use crate::error::Result;
use crate::fetcher::{ArchiveFetcher, FetchOptions, FetchedArchive};

/// Blocking wrapper around [`ArchiveFetcher`].
///
/// Uses an internal single-threaded Tokio runtime.
pub struct ArchiveFetcherBlocking {
    rt: tokio::runtime::Runtime,
    inner: ArchiveFetcher,
}

impl ArchiveFetcherBlocking {
    pub fn new(options: FetchOptions) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let inner = ArchiveFetcher::new(options)?;
        Ok(Self { rt, inner })
    }

    /// Download and extract (blocking).
    pub fn fetch(&self, url: &str, destination: &Path) -> Result<FetchedArchive> {
        self.rt.block_on(self.inner.fetch(url, destination))
    }
}

/// One-shot convenience function: download `url` into `destination`.
pub fn fetch_archive(
    url: &str,
    destination: &Path,
    options: FetchOptions,
) -> Result<FetchedArchive> {
    ArchiveFetcherBlocking::new(options)?.fetch(url, destination)
}
