//! Output file naming.

use std::path::{Component, Path};

use tracing::debug;
use url::Url;

/// Name used when neither the caller nor the URL provides one.
pub(crate) const FALLBACK_FILENAME: &str = "download";

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

/// Last path segment of `url`, percent-decoded and sanitized.
pub(crate) fn filename_from_url(url: &Url) -> String {
    let Some(last) = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty())
    else {
        return FALLBACK_FILENAME.to_string();
    };

    let decoded = urlencoding::decode(last).unwrap_or_else(|e| {
        debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
        last.into()
    });
    sanitize_filename(&decoded)
}

/// Picks the output name: the preferred name when usable, else the URL's last segment.
pub(crate) fn choose_filename(url: &Url, preferred: Option<&str>) -> String {
    preferred
        .filter(|name| !name.trim().is_empty())
        .map(sanitize_filename)
        .unwrap_or_else(|| filename_from_url(url))
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
