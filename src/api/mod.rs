//! RapidShare API protocol layer.
//!
//! # Architecture
//!
//! - [`parser`] - Response body decoding (raw text, comma rows, `key=value` lines)
//! - [`classify`] - `ERROR: ` sentinel detection and error mapping
//! - [`request`] - Signed request URL construction
//! - [`transport`] - The GET seam ([`Transport`]) and its reqwest implementation
//! - [`session`] - One-time session token resolution
//! - [`files`] - File references and batched status checks
//! - [`client`] - [`RapidShareClient`], tying the pieces together
//!
//! A call flows leaf-to-root: the request builder signs the call with the
//! session cookie, the transport fetches it, the classifier rejects error
//! bodies, and the parser decodes what is left.

pub mod classify;
pub mod client;
pub mod error;
pub mod files;
pub mod parser;
pub mod request;
pub mod session;
pub mod transport;

pub use classify::{ERROR_PREFIX, classify};
pub use client::{ApiEndpoint, ClientBuilder, DownloadOptions, RapidShareClient};
pub use error::ApiError;
pub use files::{FileReference, FileStatus, FileStatusRecord, download_url, is_file_url};
pub use parser::{KeyValueMap, ParsedResponse, Row, Shape, parse};
pub use request::{API_BASE_URL, Params, ServiceCall, build_url};
pub use session::{Credentials, SessionManager, SessionState, SessionToken, TokenInit};
pub use transport::{HttpTransport, Transport};
