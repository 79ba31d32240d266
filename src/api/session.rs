//! Session acquisition.
//!
//! A client authenticates once, when it is built. The session token either
//! comes from the caller (and is validated with one account-details call) or
//! is minted by exchanging login and password. Anonymous clients skip the
//! exchange entirely and send no cookie.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use super::client::ApiEndpoint;
use super::error::ApiError;
use super::parser::parse_key_values;
use super::request::{COOKIE_PARAM, ServiceCall};

/// Service used both to validate a token and to mint one.
pub const ACCOUNT_DETAILS_SERVICE: &str = "getaccountdetails";

/// Opaque session credential sent as the `cookie` parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Premium account login and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account login.
    pub login: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// How a client obtains its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInit {
    /// Use an existing session token after validating it.
    Token(SessionToken),
    /// Exchange credentials for a fresh token.
    Credentials(Credentials),
    /// Free-tier use: no session, no `cookie` parameter.
    Anonymous,
}

impl TokenInit {
    /// Session from an existing token.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SessionToken::new(token))
    }

    /// Session from login and password.
    pub fn credentials(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Credentials(Credentials::new(login, password))
    }
}

/// Lifecycle of a session resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing attempted yet.
    #[default]
    Unresolved,
    /// A resolution call is in flight.
    Resolving,
    /// Resolution finished; `None` for anonymous sessions.
    Resolved(Option<SessionToken>),
    /// Resolution failed; the manager cannot be reused.
    Failed,
}

/// Resolves a session token at most once.
#[derive(Debug, Default)]
pub struct SessionManager {
    state: SessionState,
}

impl SessionManager {
    /// Creates an unresolved manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The resolved token, if resolution succeeded with one.
    #[must_use]
    pub fn token(&self) -> Option<&SessionToken> {
        match &self.state {
            SessionState::Resolved(token) => token.as_ref(),
            _ => None,
        }
    }

    /// Resolves the session described by `init` through `endpoint`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Caller`] if this manager already attempted a resolution
    /// - [`ApiError::Authentication`] if the token or credentials are rejected,
    ///   or the credential exchange returns no cookie
    /// - any other error of the validating call, unchanged
    #[instrument(level = "debug", skip_all)]
    pub async fn resolve(
        &mut self,
        endpoint: &ApiEndpoint,
        init: TokenInit,
    ) -> Result<Option<SessionToken>, ApiError> {
        if self.state != SessionState::Unresolved {
            return Err(ApiError::caller("session has already been resolved"));
        }
        self.state = SessionState::Resolving;

        let outcome = match init {
            TokenInit::Anonymous => {
                info!("anonymous session, skipping login");
                Ok(None)
            }
            TokenInit::Token(token) => validate_token(endpoint, token).await.map(Some),
            TokenInit::Credentials(credentials) => {
                exchange_credentials(endpoint, &credentials).await.map(Some)
            }
        };

        match outcome {
            Ok(token) => {
                self.state = SessionState::Resolved(token.clone());
                Ok(token)
            }
            Err(error) => {
                warn!(error = %error, "session resolution failed");
                self.state = SessionState::Failed;
                Err(error)
            }
        }
    }
}

async fn validate_token(
    endpoint: &ApiEndpoint,
    token: SessionToken,
) -> Result<SessionToken, ApiError> {
    debug!("validating supplied session token");
    let call = ServiceCall::new(ACCOUNT_DETAILS_SERVICE);
    endpoint.request_body(&call, Some(&token)).await?;
    info!("session token accepted");
    Ok(token)
}

async fn exchange_credentials(
    endpoint: &ApiEndpoint,
    credentials: &Credentials,
) -> Result<SessionToken, ApiError> {
    debug!(login = %credentials.login, "exchanging credentials for session token");
    let call = ServiceCall::new(ACCOUNT_DETAILS_SERVICE)
        .param("login", credentials.login.as_str())
        .param("password", credentials.password.as_str())
        .param("withcookie", "1");
    let body = endpoint.request_body(&call, None).await?;

    let details = parse_key_values(&body);
    let token = details
        .get(COOKIE_PARAM)
        .map(str::trim)
        .filter(|cookie| !cookie.is_empty())
        .map(SessionToken::new)
        .ok_or(ApiError::Authentication)?;

    info!(login = %credentials.login, "logged in");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_debug_is_redacted() {
        let token = SessionToken::new("F0EEB41B38363A41");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("F0EEB41B38363A41"), "leaked: {rendered}");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let init = TokenInit::credentials("valid_login", "hunter2");
        let rendered = format!("{init:?}");
        assert!(rendered.contains("valid_login"));
        assert!(!rendered.contains("hunter2"), "leaked: {rendered}");
    }

    #[test]
    fn test_new_manager_is_unresolved_without_token() {
        let manager = SessionManager::new();
        assert_eq!(manager.state(), &SessionState::Unresolved);
        assert!(manager.token().is_none());
    }
}
