//! RapidShare API client library.
//!
//! This library talks to the RapidShare file-hosting API: it resolves a
//! session once (from a cookie, from login and password, or anonymously),
//! signs service calls with it, decodes the API's plain-text response formats,
//! maps `ERROR: ` responses to typed errors, checks file status in batches and
//! streams downloadable files to disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - Request/response protocol layer and [`RapidShareClient`]
//! - [`download`] - Streaming file download to a resolved URL
//!
//! # Example
//!
//! ```no_run
//! use rapidshare::{Params, RapidShareClient, Shape, TokenInit};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RapidShareClient::connect(TokenInit::token("F0EEB41B38363A41")).await?;
//!
//! let details = client.get_account_details().await?;
//! println!("rapids: {:?}", details.get("rapids"));
//!
//! let logs = client
//!     .call("getrapidtranslogs", Params::new(), Shape::DelimitedRows)
//!     .await?;
//! println!("{logs:?}");
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod download;
mod user_agent;

// Re-export commonly used types
pub use api::{
    ApiError, ClientBuilder, DownloadOptions, FileReference, FileStatus, FileStatusRecord,
    KeyValueMap, Params, ParsedResponse, RapidShareClient, Shape, TokenInit,
};
pub use download::{DownloadError, DownloadedFile};
