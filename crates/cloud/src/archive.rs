//! ZIP extraction into a destination directory.
//!
//! Entries are unpacked into a staging directory first and moved into the
//! destination only when every entry was written, so a corrupt archive or a
//! full disk leaves the destination as it was.

use geoslim_core::io::Staging;
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{FetchError, Result};

/// Default cap on the total uncompressed size of an archive (4 GiB)
pub const DEFAULT_MAX_EXTRACTED_BYTES: u64 = 4 << 30;

/// Extract an in-memory ZIP archive into `destination`.
///
/// Returns the extracted file paths. `destination` is created on success.
pub fn extract_archive(bytes: &[u8], destination: &Path) -> Result<Vec<PathBuf>> {
    extract_archive_with_limit(bytes, destination, DEFAULT_MAX_EXTRACTED_BYTES)
}

/// Like [`extract_archive`], failing once more than `max_bytes` have been
/// written out.
pub fn extract_archive_with_limit(
    bytes: &[u8],
    destination: &Path,
    max_bytes: u64,
) -> Result<Vec<PathBuf>> {
    extract_from(Cursor::new(bytes), destination, max_bytes)
}

/// Extract a ZIP archive on disk into `destination`.
pub fn extract_archive_file(archive: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive)?;
    extract_from(file, destination, DEFAULT_MAX_EXTRACTED_BYTES)
}

fn extract_from<R: Read + Seek>(
    reader: R,
    destination: &Path,
    max_bytes: u64,
) -> Result<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(reader)?;
    if destination.exists() && !destination.is_dir() {
        return Err(FetchError::DestinationNotWritable {
            path: destination.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
        });
    }

    let staging = Staging::for_target(destination).map_err(|e| match e {
        geoslim_core::Error::Io(io) => FetchError::from_write(destination, io),
        other => FetchError::Core(other),
    })?;

    let mut written_total = 0u64;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            return Err(FetchError::UnsafeEntry { name });
        };
        let target = staging.path().join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| FetchError::from_write(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FetchError::from_write(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| FetchError::from_write(&target, e))?;
        // Declared sizes can lie; count what is actually inflated
        let remaining = max_bytes - written_total;
        match io::copy(&mut (&mut entry).take(remaining + 1), &mut out) {
            Ok(written) if written > remaining => {
                return Err(FetchError::ExtractedTooLarge { limit: max_bytes });
            }
            Ok(written) => {
                written_total += written;
                debug!("extracted {} ({} bytes)", relative.display(), written);
            }
            // Decompression and CRC failures surface as read errors
            Err(e) if e.kind() == io::ErrorKind::InvalidData || e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(FetchError::InvalidArchive(format!("{}: {}", name, e)));
            }
            Err(e) => return Err(FetchError::from_write(&target, e)),
        }
    }

    let files = staging.commit_into(destination).map_err(|e| match e {
        geoslim_core::Error::Io(io) => FetchError::from_write(destination, io),
        other => FetchError::Core(other),
    })?;
    info!("extracted {} files into {}", files.len(), destination.display());
    Ok(files)
}
