//! The RapidShare API client.
//!
//! [`ApiEndpoint`] is the unauthenticated request pipeline: build the URL,
//! GET it, classify the body, decode it. [`RapidShareClient`] adds the session
//! resolved at construction and the typed service methods.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::classify::classify;
use super::error::ApiError;
use super::files::{self, FileReference, FileStatusRecord};
use super::parser::{self, KeyValueMap, ParsedResponse, Row, Shape};
use super::request::{API_BASE_URL, Params, ServiceCall, build_url, parse_base_url};
use super::session::{ACCOUNT_DETAILS_SERVICE, SessionManager, SessionToken, TokenInit};
use super::transport::{API_CONNECT_TIMEOUT_SECS, API_READ_TIMEOUT_SECS, HttpTransport, Transport};
use crate::download::{
    DOWNLOAD_CONNECT_TIMEOUT_SECS, DOWNLOAD_READ_TIMEOUT_SECS, DownloadError, DownloadedFile,
    HttpDownloader,
};

/// Service listing the account's RapidPoint transactions.
pub const RAPID_TRANS_LOGS_SERVICE: &str = "getrapidtranslogs";

/// Unauthenticated request pipeline against one API base URL.
#[derive(Clone)]
pub struct ApiEndpoint {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl ApiEndpoint {
    /// Creates an endpoint over `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// Sends `call` and returns the body once it has passed error classification.
    ///
    /// # Errors
    ///
    /// Returns transport errors, or the error the body reports.
    pub async fn request_body(
        &self,
        call: &ServiceCall,
        session: Option<&SessionToken>,
    ) -> Result<String, ApiError> {
        let url = build_url(&self.base_url, &call.service, &call.params, session)?;
        let body = self.transport.get(&url).await?;
        classify(&body, &call.service)?;
        Ok(body)
    }

    /// Sends `call` and decodes the body into `call.shape`.
    ///
    /// # Errors
    ///
    /// Same as [`request_body`](Self::request_body).
    pub async fn request(
        &self,
        call: &ServiceCall,
        session: Option<&SessionToken>,
    ) -> Result<ParsedResponse, ApiError> {
        let body = self.request_body(call, session).await?;
        Ok(parser::parse(&body, call.shape))
    }
}

impl std::fmt::Debug for ApiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEndpoint")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Options for [`RapidShareClient::download`].
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Directory the file is saved into; the current directory when unset.
    pub downloads_dir: Option<PathBuf>,
    /// File name to save under; the name from the link when unset.
    pub filename: Option<String>,
}

impl DownloadOptions {
    fn output_dir(&self) -> &Path {
        self.downloads_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }
}

/// Configures and connects a [`RapidShareClient`].
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    api_timeouts: Option<(u64, u64)>,
    download_timeouts: Option<(u64, u64)>,
}

impl ClientBuilder {
    /// Overrides the API endpoint (defaults to [`API_BASE_URL`]).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Uses a custom transport for API calls instead of [`HttpTransport`].
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Connect and read timeouts for API calls, in seconds.
    #[must_use]
    pub fn api_timeouts(mut self, connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        self.api_timeouts = Some((connect_timeout_secs, read_timeout_secs));
        self
    }

    /// Connect and read timeouts for file downloads, in seconds.
    #[must_use]
    pub fn download_timeouts(mut self, connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        self.download_timeouts = Some((connect_timeout_secs, read_timeout_secs));
        self
    }

    /// Builds the client and resolves its session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Caller`] for an invalid base URL,
    /// [`ApiError::ClientBuild`] if an HTTP client cannot be built, and any
    /// error of session resolution.
    pub async fn connect(self, init: TokenInit) -> Result<RapidShareClient, ApiError> {
        let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(API_BASE_URL))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let (connect, read) = self
                    .api_timeouts
                    .unwrap_or((API_CONNECT_TIMEOUT_SECS, API_READ_TIMEOUT_SECS));
                Arc::new(HttpTransport::with_timeouts(connect, read)?)
            }
        };

        let (connect, read) = self
            .download_timeouts
            .unwrap_or((DOWNLOAD_CONNECT_TIMEOUT_SECS, DOWNLOAD_READ_TIMEOUT_SECS));
        let downloader = HttpDownloader::with_timeouts(connect, read).map_err(|e| {
            ApiError::ClientBuild {
                reason: e.to_string(),
            }
        })?;

        let endpoint = ApiEndpoint::new(transport, base_url);
        let mut session = SessionManager::new();
        session.resolve(&endpoint, init).await?;

        Ok(RapidShareClient {
            endpoint,
            session,
            downloader,
        })
    }
}

/// Client for the RapidShare API with a session resolved once at construction.
///
/// # Example
///
/// ```no_run
/// use rapidshare::{RapidShareClient, TokenInit};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RapidShareClient::connect(TokenInit::credentials("login", "password")).await?;
/// let records = client
///     .check_files(&["https://rapidshare.com/files/829628035/HornyRhinos.jpg"])
///     .await?;
/// for record in records {
///     println!("{} {}", record.file_name, record.status);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RapidShareClient {
    endpoint: ApiEndpoint,
    session: SessionManager,
    downloader: HttpDownloader,
}

impl RapidShareClient {
    /// Starts configuring a client.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Connects to the default endpoint with default timeouts.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::connect`].
    pub async fn connect(init: TokenInit) -> Result<Self, ApiError> {
        Self::builder().connect(init).await
    }

    /// The session token in use; `None` for anonymous clients.
    #[must_use]
    pub fn session_token(&self) -> Option<&SessionToken> {
        self.session.token()
    }

    /// Returns true when calls carry no session cookie.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.session_token().is_none()
    }

    /// The underlying request pipeline.
    #[must_use]
    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    /// Calls any service by name and decodes the response into `shape`.
    ///
    /// The service name is sent verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownService`] for services the API does not know,
    /// plus every error of [`ApiEndpoint::request_body`].
    #[instrument(skip_all, fields(service = %service.as_ref()))]
    pub async fn call(
        &self,
        service: impl AsRef<str>,
        params: Params,
        shape: Shape,
    ) -> Result<ParsedResponse, ApiError> {
        let call = ServiceCall::new(service.as_ref()).params(params).shape(shape);
        self.request(&call).await
    }

    /// Sends a prepared call with this client's session.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn request(&self, call: &ServiceCall) -> Result<ParsedResponse, ApiError> {
        self.endpoint.request(call, self.session_token()).await
    }

    /// Account details (`getaccountdetails`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] if the session is no longer valid.
    #[instrument(skip(self))]
    pub async fn get_account_details(&self) -> Result<KeyValueMap, ApiError> {
        let call = ServiceCall::new(ACCOUNT_DETAILS_SERVICE).shape(Shape::KeyValueMap);
        Ok(self.request(&call).await?.into_map().unwrap_or_default())
    }

    /// RapidPoint transaction log (`getrapidtranslogs`), one row per transaction.
    ///
    /// # Errors
    ///
    /// Returns the API error for anonymous or rejected sessions.
    #[instrument(skip(self))]
    pub async fn get_rapid_trans_logs(&self) -> Result<Vec<Row>, ApiError> {
        let call = ServiceCall::new(RAPID_TRANS_LOGS_SERVICE).shape(Shape::DelimitedRows);
        Ok(self.request(&call).await?.into_rows().unwrap_or_default())
    }

    /// Checks the status of every file link in one batched request.
    ///
    /// Links that are not file links are sent as empty entries rather than
    /// dropped; the API then reports them (or rejects the batch).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Caller`] for an empty slice without any request,
    /// or the error of the batched call.
    pub async fn check_files<S: AsRef<str>>(
        &self,
        urls: &[S],
    ) -> Result<Vec<FileStatusRecord>, ApiError> {
        let refs: Vec<FileReference> = urls
            .iter()
            .map(|url| FileReference::parse(url.as_ref()))
            .collect();
        self.check_file_references(&refs).await
    }

    /// Checks the status of already decomposed file references.
    ///
    /// # Errors
    ///
    /// See [`check_files`](Self::check_files).
    #[instrument(skip_all, fields(files = refs.len()))]
    pub async fn check_file_references(
        &self,
        refs: &[FileReference],
    ) -> Result<Vec<FileStatusRecord>, ApiError> {
        let call = files::status_call(refs)?;
        let rows = self.request(&call).await?.into_rows().unwrap_or_default();
        let records = files::decode_status_rows(&rows, refs.len());
        debug!(records = records.len(), "file status decoded");
        Ok(records)
    }

    /// Checks one file link and, if it is downloadable, streams it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::NotDownloadable`] without downloading when the
    /// file status is not ok, [`DownloadError::Api`] when the status check
    /// fails, and the transfer error otherwise.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<DownloadedFile, DownloadError> {
        let records = self.check_files(&[url]).await?;
        let Some(record) = records.into_iter().next() else {
            return Err(DownloadError::Api(ApiError::generic(
                "checkfiles returned no status for the file",
            )));
        };

        self.download_record(&record, options).await
    }

    /// Streams a file whose status is already known.
    ///
    /// # Errors
    ///
    /// See [`download`](Self::download).
    pub async fn download_record(
        &self,
        record: &FileStatusRecord,
        options: &DownloadOptions,
    ) -> Result<DownloadedFile, DownloadError> {
        if !record.is_downloadable() {
            warn!(
                file_id = %record.file_id,
                file_name = %record.file_name,
                status = %record.status,
                "file is not downloadable"
            );
            return Err(DownloadError::not_downloadable(
                &record.file_id,
                &record.file_name,
                record.status,
            ));
        }

        let filename = options
            .filename
            .as_deref()
            .unwrap_or(record.file_name.as_str());
        let downloaded = self
            .downloader
            .download_to_file(&record.download_url(), options.output_dir(), Some(filename))
            .await?;

        info!(
            file_id = %record.file_id,
            path = %downloaded.path.display(),
            bytes = downloaded.bytes_downloaded,
            "file downloaded"
        );
        Ok(downloaded)
    }
}
