//! Error sentinel detection.
//!
//! The API reports failures in-band: the HTTP status is 200 and the body
//! starts with `ERROR: `, followed by a message that ends at the first `.`
//! (usually trailed by a request id, e.g. `ERROR: Login failed. (5b97895d)`).

use tracing::debug;

use super::error::ApiError;

/// Prefix that marks a response body as an error report.
pub const ERROR_PREFIX: &str = "ERROR: ";

const LOGIN_FAILED: &str = "Login failed";
const INVALID_ROUTINE: &str = "Invalid routine called";

/// Classifies a raw response body returned for `service`.
///
/// # Errors
///
/// - [`ApiError::Authentication`] for `Login failed`
/// - [`ApiError::UnknownService`] carrying `service` for `Invalid routine called`
/// - [`ApiError::Generic`] carrying the message for anything else
pub fn classify(body: &str, service: &str) -> Result<(), ApiError> {
    let Some(report) = body.strip_prefix(ERROR_PREFIX) else {
        return Ok(());
    };

    let message = error_message(report);
    debug!(service, message, "API reported an error");

    match message {
        LOGIN_FAILED => Err(ApiError::Authentication),
        INVALID_ROUTINE => Err(ApiError::unknown_service(service)),
        other => Err(ApiError::generic(other)),
    }
}

/// Text of the report up to, not including, the first `.`.
fn error_message(report: &str) -> &str {
    report.split('.').next().unwrap_or_default()
}
