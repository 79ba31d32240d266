//! Shared User-Agent strings for API and download HTTP clients.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/tomaskavka/rapidshare";

/// Default User-Agent for API calls.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("rapidshare/{version} (api-client; +{PROJECT_UA_URL})")
}

/// Default User-Agent for file downloads.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("rapidshare/{version} (downloader; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agents_share_version_and_project_url() {
        for ua in [default_api_user_agent(), default_download_user_agent()] {
            assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL: {ua}");
            assert_eq!(
                ua.strip_prefix("rapidshare/")
                    .and_then(|s| s.split(' ').next()),
                Some(env!("CARGO_PKG_VERSION")),
                "UA must contain crate version: {ua}"
            );
        }
    }

    #[test]
    fn test_user_agents_identify_purpose() {
        assert!(default_api_user_agent().contains("api-client"));
        assert!(default_download_user_agent().contains("downloader"));
    }
}
