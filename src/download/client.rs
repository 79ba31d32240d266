//! HTTP client wrapper for downloading files.
//!
//! This module provides the `HttpDownloader` struct which streams one GET
//! response to disk with timeout configuration and error handling. There is no
//! retry and no resume: a failed transfer removes its partial file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use super::filename::choose_filename;
use crate::user_agent;

/// Default HTTP connect timeout for downloads (30 seconds).
pub const DOWNLOAD_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout for downloads (5 minutes for large files).
pub const DOWNLOAD_READ_TIMEOUT_SECS: u64 = 300;

/// HTTP client for downloading files with streaming support.
///
/// Created once per API client and reused for every download, taking
/// advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

/// Outcome of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Final output path.
    pub path: PathBuf,
    /// Bytes written to disk.
    pub bytes_downloaded: u64,
}

impl HttpDownloader {
    /// Creates a downloader with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_timeouts(DOWNLOAD_CONNECT_TIMEOUT_SECS, DOWNLOAD_READ_TIMEOUT_SECS)
    }

    /// Creates a downloader with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] if the HTTP client cannot be built.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_download_user_agent())
            .build()
            .map_err(|e| DownloadError::network("<client construction>", e))?;
        Ok(Self { client })
    }

    /// Downloads `url` into `output_dir`.
    ///
    /// The file is saved as `preferred_filename` when given, otherwise under the
    /// last segment of the URL path. An existing file of that name is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Writing to disk fails
    #[instrument(skip(self, output_dir), fields(url = %url))]
    pub async fn download_to_file(
        &self,
        url: &str,
        output_dir: &Path,
        preferred_filename: Option<&str>,
    ) -> Result<DownloadedFile, DownloadError> {
        debug!("starting download");

        let parsed_url = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        let file_path = output_dir.join(choose_filename(&parsed_url, preferred_filename));

        let response = self.client.get(parsed_url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        if !response.status().is_success() {
            return Err(DownloadError::http_status(url, response.status().as_u16()));
        }

        debug!(path = %file_path.display(), "resolved output path");
        let mut file = File::create(&file_path)
            .await
            .map_err(|e| DownloadError::io(file_path.clone(), e))?;

        let stream_result = stream_to_file(&mut file, response, url, &file_path).await;
        if stream_result.is_err() {
            debug!(path = %file_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&file_path).await;
        }
        let bytes_downloaded = stream_result?;

        info!(path = %file_path.display(), bytes = bytes_downloaded, "download complete");
        Ok(DownloadedFile {
            path: file_path,
            bytes_downloaded,
        })
    }
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[tokio::test]
    async fn test_download_invalid_url() {
        let downloader = HttpDownloader::new().unwrap();
        let temp_dir = TempDir::new().unwrap();

        let result = downloader
            .download_to_file("not-a-valid-url", temp_dir.path(), None)
            .await;

        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_download_unreachable_host_leaves_no_file() {
        let downloader = HttpDownloader::with_timeouts(1, 1).unwrap();
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = downloader
            .download_to_file("http://127.0.0.1:9/files/1/a.jpg", &missing, None)
            .await;

        // Nothing listens on the discard port, so the request fails before
        // the file would be created.
        assert!(
            matches!(
                result,
                Err(DownloadError::Network { .. } | DownloadError::Timeout { .. })
            ),
            "got {result:?}"
        );
        assert!(!missing.exists());
    }
}
