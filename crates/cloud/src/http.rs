//! HTTP client wrapper for whole-body downloads with a size cap.

use crate::error::{FetchError, Result};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Upper bound on the buffer reserved up front from `Content-Length`
const MAX_PREALLOCATION: u64 = 16 << 20;

/// HTTP client for fetching complete remote files.
pub struct HttpClient {
    client: Client,
    request_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(request_timeout: Duration, user_agent: &str, use_system_proxy: bool) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(request_timeout)
            .user_agent(user_agent);
        if !use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|e| FetchError::Network {
            url: String::new(),
            source: e,
        })?;

        Ok(Self {
            client,
            request_timeout,
        })
    }

    /// Download the body behind `url`, refusing more than `max_bytes`.
    ///
    /// A declared `Content-Length` over the limit fails before the body is
    /// read; an undeclared one fails as soon as the limit is crossed.
    pub async fn get_bytes(&self, url: &Url, max_bytes: u64) -> Result<Vec<u8>> {
        let network = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let mut resp = self.client.get(url.clone()).send().await.map_err(network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(size) = resp.content_length() {
            if size > max_bytes {
                return Err(FetchError::TooLarge {
                    size,
                    limit: max_bytes,
                });
            }
        }

        let declared = resp.content_length().unwrap_or(0).min(MAX_PREALLOCATION);
        let mut body = Vec::with_capacity(declared as usize);
        while let Some(chunk) = resp.chunk().await.map_err(network)? {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > max_bytes {
                return Err(FetchError::TooLarge {
                    size: body.len() as u64,
                    limit: max_bytes,
                });
            }
        }
        debug!("downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Getter for the timeout duration.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Parse a URL and require an http or https scheme.
pub fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}
