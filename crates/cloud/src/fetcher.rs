//! Download a ZIP archive and unpack it into a directory.

use geoslim_core::Error as LayerError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::archive::{extract_archive_with_limit, DEFAULT_MAX_EXTRACTED_BYTES};
use crate::error::Result;
use crate::http::{parse_url, HttpClient};

/// Options for [`ArchiveFetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timeout covering the whole request, body included (default: 120 s)
    pub request_timeout: Duration,
    /// User-Agent header sent with the request
    pub user_agent: String,
    /// Largest archive accepted, in bytes (default: 1 GiB)
    pub max_bytes: u64,
    /// Largest total size of the unpacked entries (default: 4 GiB)
    pub max_extracted_bytes: u64,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub use_system_proxy: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            user_agent: concat!("geoslim/", env!("CARGO_PKG_VERSION")).to_string(),
            max_bytes: 1 << 30,
            max_extracted_bytes: DEFAULT_MAX_EXTRACTED_BYTES,
            use_system_proxy: true,
        }
    }
}

/// Files unpacked from one fetched archive.
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    pub url: String,
    pub destination: PathBuf,
    /// Extracted files, sorted
    pub files: Vec<PathBuf>,
    /// Size of the downloaded archive
    pub bytes: u64,
}

impl FetchedArchive {
    /// The `.shp` files among the extracted files.
    pub fn layers(&self) -> Vec<PathBuf> {
        shapefiles(&self.files)
    }

    /// Pick the layer to process.
    ///
    /// With a `name`, matches the file stem (case-insensitive). Without one,
    /// the archive must hold exactly one layer.
    pub fn find_layer(&self, name: Option<&str>) -> geoslim_core::Result<PathBuf> {
        find_layer_in(&self.destination, &self.layers(), name)
    }
}

/// Layer selection shared by fetched archives and plain directories.
pub fn find_layer_in(
    dir: &Path,
    layers: &[PathBuf],
    name: Option<&str>,
) -> geoslim_core::Result<PathBuf> {
    let stems: Vec<String> = layers
        .iter()
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();

    match name {
        Some(wanted) => {
            let wanted = wanted.strip_suffix(".shp").unwrap_or(wanted);
            layers
                .iter()
                .zip(&stems)
                .find(|(_, stem)| stem.eq_ignore_ascii_case(wanted))
                .map(|(path, _)| path.clone())
                .ok_or_else(|| LayerError::UnknownLayer {
                    name: wanted.to_string(),
                    available: stems.clone(),
                })
        }
        None => match layers {
            [] => Err(LayerError::MissingLayer {
                path: dir.join("*.shp"),
            }),
            [only] => Ok(only.clone()),
            _ => Err(LayerError::AmbiguousLayer { candidates: stems }),
        },
    }
}

fn shapefiles(files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"))
        })
        .cloned()
        .collect()
}

/// Fetches remote ZIP archives into local directories.
pub struct ArchiveFetcher {
    client: HttpClient,
    options: FetchOptions,
}

impl ArchiveFetcher {
    pub fn new(options: FetchOptions) -> Result<Self> {
        let client = HttpClient::new(
            options.request_timeout,
            &options.user_agent,
            options.use_system_proxy,
        )?;
        Ok(Self { client, options })
    }

    /// Download `url` and extract it into `destination`.
    ///
    /// The destination is only created once the whole archive has been
    /// downloaded and every entry extracted.
    pub async fn fetch(&self, url: &str, destination: &Path) -> Result<FetchedArchive> {
        let parsed = parse_url(url)?;
        info!(
            "fetching {} (timeout {:?})",
            parsed,
            self.client.request_timeout()
        );

        let body = self.client.get_bytes(&parsed, self.options.max_bytes).await?;
        let bytes = body.len() as u64;
        let files =
            extract_archive_with_limit(&body, destination, self.options.max_extracted_bytes)?;

        Ok(FetchedArchive {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            files,
            bytes,
        })
    }
}
