//! HTTP download of resolved file URLs.
//!
//! This module streams a direct-download URL (as produced by a file status
//! check) to disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Output name from the caller, else from the URL path
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use rapidshare::download::HttpDownloader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = HttpDownloader::new()?;
//! let file = downloader
//!     .download_to_file(
//!         "https://rs370l33.rapidshare.com/files/829628035/HornyRhinos.jpg",
//!         Path::new("./downloads"),
//!         None,
//!     )
//!     .await?;
//! println!("Downloaded: {}", file.path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod filename;

pub use client::{
    DOWNLOAD_CONNECT_TIMEOUT_SECS, DOWNLOAD_READ_TIMEOUT_SECS, DownloadedFile, HttpDownloader,
};
pub use error::DownloadError;
