//! Error types for API calls.
//!
//! Every failure a service call can produce is one variant of [`ApiError`]:
//! the three remote error kinds reported through the `ERROR: ` sentinel,
//! local caller errors that never reach the network, and transport failures.

use thiserror::Error;
use url::Url;

/// Query parameters whose values must never appear in error messages or logs.
const SECRET_PARAMS: [&str; 2] = ["cookie", "password"];

/// Errors that can occur while talking to the RapidShare API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the credentials or the session cookie.
    #[error("login failed: invalid credentials or session cookie")]
    Authentication,

    /// The API does not know the requested service.
    #[error("invalid routine called: {service}")]
    UnknownService {
        /// The service name that was requested.
        service: String,
    },

    /// Any other `ERROR: ` response.
    #[error("API error: {message}")]
    Generic {
        /// The error message as sent by the API, without the `ERROR: ` prefix.
        message: String,
    },

    /// A local precondition was violated; no request was sent.
    #[error("invalid request: {reason}")]
    Caller {
        /// What was wrong with the call.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error calling {url}: {source}")]
    Network {
        /// The request URL, with secrets redacted.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout calling {url}")]
    Timeout {
        /// The request URL, with secrets redacted.
        url: String,
    },

    /// The API endpoint answered with a non-success HTTP status.
    #[error("HTTP {status} calling {url}")]
    HttpStatus {
        /// The request URL, with secrets redacted.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Why construction failed.
        reason: String,
    },
}

impl ApiError {
    /// Creates a caller error.
    pub fn caller(reason: impl Into<String>) -> Self {
        Self::Caller {
            reason: reason.into(),
        }
    }

    /// Creates an unknown-service error.
    pub fn unknown_service(service: impl Into<String>) -> Self {
        Self::UnknownService {
            service: service.into(),
        }
    }

    /// Creates a generic API error.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Creates a network error for a request URL.
    #[must_use]
    pub fn network(url: &Url, source: reqwest::Error) -> Self {
        Self::Network {
            url: redact_url(url),
            // reqwest embeds the full URL in its own message
            source: source.without_url(),
        }
    }

    /// Creates a timeout error for a request URL.
    #[must_use]
    pub fn timeout(url: &Url) -> Self {
        Self::Timeout {
            url: redact_url(url),
        }
    }

    /// Creates an HTTP status error for a request URL.
    #[must_use]
    pub fn http_status(url: &Url, status: u16) -> Self {
        Self::HttpStatus {
            url: redact_url(url),
            status,
        }
    }
}

/// Renders a request URL with the values of secret query parameters masked.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if SECRET_PARAMS.contains(&key.as_ref()) {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
