//! Request construction.
//!
//! Every API call is a GET on one fixed endpoint. The service name travels as
//! `sub`, caller parameters follow in insertion order, and the session cookie,
//! when there is one, is merged in last.

use tracing::debug;
use url::Url;

use super::error::{ApiError, redact_url};
use super::parser::Shape;
use super::session::SessionToken;

/// The RapidShare API endpoint.
pub const API_BASE_URL: &str = "https://api.rapidshare.com/cgi-bin/rsapi.cgi";

/// Query parameter carrying the service name.
pub const SERVICE_PARAM: &str = "sub";

/// Query parameter carrying the session token.
pub const COOKIE_PARAM: &str = "cookie";

/// Ordered service parameters.
///
/// Setting a key that is already present replaces its value in place, so the
/// query string order is the order in which keys were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.pairs.push((key, value));
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true when no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// One named remote operation with its parameters and the expected response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCall {
    /// Service name sent as `sub`, verbatim.
    pub service: String,
    /// Service parameters.
    pub params: Params,
    /// How the response body is decoded.
    pub shape: Shape,
}

impl ServiceCall {
    /// Creates a call with no parameters and a raw response.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            params: Params::new(),
            shape: Shape::Raw,
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.set(key, value);
        self
    }

    /// Replaces all parameters.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the response shape.
    #[must_use]
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// Builds the signed request URL for `service` against `base`.
///
/// The query is `sub=<service>`, then every entry of `params`, then
/// `cookie=<token>` when a session is given. A caller-supplied `cookie` is
/// overwritten in place by the session token, so the URL never carries two.
///
/// # Errors
///
/// Returns [`ApiError::Caller`] when `service` is empty.
pub fn build_url(
    base: &Url,
    service: &str,
    params: &Params,
    session: Option<&SessionToken>,
) -> Result<Url, ApiError> {
    if service.trim().is_empty() {
        return Err(ApiError::caller("service name must not be empty"));
    }

    let mut merged = params.clone();
    if let Some(token) = session {
        merged.set(COOKIE_PARAM, token.as_str());
    }

    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair(SERVICE_PARAM, service);
        for (key, value) in merged.iter() {
            query.append_pair(key, value);
        }
    }

    debug!(url = %redact_url(&url), "built API request");
    Ok(url)
}

/// Parses the default API endpoint.
///
/// # Errors
///
/// Returns [`ApiError::Caller`] if `raw` is not an absolute URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::caller(format!("invalid API base URL '{raw}': {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(API_BASE_URL).unwrap()
    }

    #[test]
    fn test_build_url_service_first_then_params_in_order() {
        let params = Params::new().with("param_1", "value_1").with("a", "b");
        let url = build_url(&base(), "invalid_routine", &params, None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.rapidshare.com/cgi-bin/rsapi.cgi?sub=invalid_routine&param_1=value_1&a=b"
        );
    }

    #[test]
    fn test_build_url_encodes_commas_in_values() {
        let params = Params::new()
            .with("files", "829628035,428232373")
            .with("filenames", "HornyRhinos.jpg,HappyHippos.jpg");
        let url = build_url(&base(), "checkfiles", &params, None).unwrap();
        assert_eq!(
            url.query(),
            Some(
                "sub=checkfiles&files=829628035%2C428232373&filenames=HornyRhinos.jpg%2CHappyHippos.jpg"
            )
        );
    }

    #[test]
    fn test_build_url_appends_exactly_one_cookie() {
        let token = SessionToken::new("TOKEN123");
        let params = Params::new().with("files", "a,b");
        let url = build_url(&base(), "checkfiles", &params, Some(&token)).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let cookies: Vec<_> = pairs.iter().filter(|(k, _)| k == "cookie").collect();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].1, "TOKEN123");
        assert!(pairs.contains(&("files".to_string(), "a,b".to_string())));
        assert_eq!(pairs.last().unwrap().0, "cookie");
    }

    #[test]
    fn test_build_url_session_token_replaces_caller_cookie_in_place() {
        let token = SessionToken::new("SESSION");
        let params = Params::new().with("cookie", "CALLER").with("files", "1");
        let url = build_url(&base(), "checkfiles", &params, Some(&token)).unwrap();
        assert_eq!(url.query(), Some("sub=checkfiles&cookie=SESSION&files=1"));
    }

    #[test]
    fn test_build_url_without_session_keeps_caller_cookie() {
        let params = Params::new().with("cookie", "CALLER");
        let url = build_url(&base(), "getaccountdetails", &params, None).unwrap();
        assert_eq!(url.query(), Some("sub=getaccountdetails&cookie=CALLER"));
    }

    #[test]
    fn test_build_url_without_session_has_no_cookie() {
        let url = build_url(&base(), "nextuploadserver", &Params::new(), None).unwrap();
        assert_eq!(url.query(), Some("sub=nextuploadserver"));
    }

    #[test]
    fn test_build_url_replaces_existing_base_query() {
        let base = Url::parse("http://127.0.0.1:8080/rsapi.cgi?stale=1").unwrap();
        let url = build_url(&base, "checkfiles", &Params::new(), None).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/rsapi.cgi?sub=checkfiles");
    }

    #[test]
    fn test_build_url_rejects_empty_service() {
        let err = build_url(&base(), " ", &Params::new(), None).unwrap_err();
        assert!(matches!(err, ApiError::Caller { .. }));
    }

    #[test]
    fn test_params_set_replaces_in_place() {
        let mut params = Params::new();
        params.set("a", "1");
        params.set("b", "2");
        params.set("a", "3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_params_from_iterator() {
        let params: Params = [("login", "alice"), ("withcookie", "1")].into_iter().collect();
        assert_eq!(params.get("login"), Some("alice"));
        assert_eq!(params.get("withcookie"), Some("1"));
    }

    #[test]
    fn test_service_call_builder() {
        let call = ServiceCall::new("getrapidtranslogs")
            .param("limit", "10")
            .shape(Shape::DelimitedRows);
        assert_eq!(call.service, "getrapidtranslogs");
        assert_eq!(call.params.get("limit"), Some("10"));
        assert_eq!(call.shape, Shape::DelimitedRows);
    }

    #[test]
    fn test_parse_base_url_rejects_relative() {
        assert!(parse_base_url("/cgi-bin/rsapi.cgi").is_err());
        assert!(parse_base_url(API_BASE_URL).is_ok());
    }
}
