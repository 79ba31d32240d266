//! Error types for the download module.
//!
//! This module defines structured errors for file transfers, providing
//! context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::{ApiError, FileStatus};

/// Errors that can occur during file downloads.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The status check reported the file as not downloadable.
    #[error("file {file_id}/{file_name} is not downloadable (status: {status})")]
    NotDownloadable {
        /// The file id from the link.
        file_id: String,
        /// The file name from the link.
        file_name: String,
        /// The decoded status.
        status: FileStatus,
    },

    /// The status check before the transfer failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a not-downloadable error.
    pub fn not_downloadable(
        file_id: impl Into<String>,
        file_name: impl Into<String>,
        status: FileStatus,
    ) -> Self {
        Self::NotDownloadable {
            file_id: file_id.into(),
            file_name: file_name.into(),
            status,
        }
    }
}

// No `From<reqwest::Error>` or `From<std::io::Error>`: every transfer variant
// needs the URL or path, which the source errors don't carry. `From<ApiError>`
// exists because API errors already carry their own context.
