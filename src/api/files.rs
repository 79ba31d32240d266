//! File references and batched status checks.
//!
//! A status check sends every requested file in one `checkfiles` call: file
//! ids and file names travel as two comma-joined lists that must stay aligned
//! position by position, and the API answers with one row per file in the
//! same order.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::ApiError;
use super::parser::{Row, Shape};
use super::request::ServiceCall;

/// Service answering per-file status rows.
pub const CHECK_FILES_SERVICE: &str = "checkfiles";

/// `scheme://host/files/{numeric_id}/{name}`, scheme matched case-insensitively.
#[allow(clippy::expect_used)]
static FILE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^/\s]+/files/([0-9]+)/(.+)$").expect("file URL regex is valid") // Static pattern, safe to panic
});

/// A remote file identified by id and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FileReference {
    /// Numeric file id, as text.
    pub file_id: String,
    /// File name as it appears in the link.
    pub file_name: String,
}

impl FileReference {
    /// Creates a reference from its parts.
    pub fn new(file_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: file_name.into(),
        }
    }

    /// Decomposes a file link into id and name.
    ///
    /// Lenient: anything that is not a file link, including the empty string,
    /// yields an empty reference instead of an error, so batch positions are
    /// never lost.
    #[must_use]
    pub fn parse(url: &str) -> Self {
        FILE_URL_PATTERN
            .captures(url.trim())
            .map(|caps| Self::new(&caps[1], &caps[2]))
            .unwrap_or_default()
    }

    /// Returns true for the placeholder produced by a failed parse.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_id.is_empty() && self.file_name.is_empty()
    }
}

/// Returns true when `url` is a file link [`FileReference::parse`] understands.
#[must_use]
pub fn is_file_url(url: &str) -> bool {
    FILE_URL_PATTERN.is_match(url.trim())
}

/// Decoded file status.
///
/// Status codes 1 (anonymous download), 2 (direct TrafficShare) and
/// 6 (logged TrafficShare) are downloadable. Codes 0 (not found), 3 (server
/// down), 4 (illegal) and 5 (anonymous-locked) are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The file can be downloaded.
    Ok,
    /// The file cannot be downloaded.
    Error,
    /// The API sent a code outside the known table.
    Unknown,
}

impl FileStatus {
    /// Maps an API status code.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 | 2 | 6 => Self::Ok,
            0 | 3..=5 => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// Maps the status field of a response row; non-numeric fields are unknown.
    #[must_use]
    pub fn from_field(field: &str) -> Self {
        field
            .trim()
            .parse::<i64>()
            .map_or(Self::Unknown, Self::from_code)
    }

    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one file as reported by `checkfiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatusRecord {
    /// Numeric file id, as text.
    pub file_id: String,
    /// File name as stored on the server.
    pub file_name: String,
    /// Size in bytes, as text; `0` when the file does not exist.
    pub file_size: String,
    /// Storage server number, the `{server_id}` in the download host.
    pub server_id: String,
    /// Decoded status code.
    pub status: FileStatus,
    /// Host suffix after the server number (`l33` in `rs370l33`).
    pub short_host: String,
    /// MD5 of the file content; `0` unless requested.
    pub md5: String,
}

impl FileStatusRecord {
    /// Decodes one response row. Missing trailing fields decode as empty strings.
    #[must_use]
    pub fn from_row(row: &[String]) -> Self {
        let field = |index: usize| row.get(index).cloned().unwrap_or_default();
        Self {
            file_id: field(0),
            file_name: field(1),
            file_size: field(2),
            server_id: field(3),
            status: FileStatus::from_field(&field(4)),
            short_host: field(5),
            md5: field(6),
        }
    }

    /// Returns true when the file can be downloaded.
    #[must_use]
    pub fn is_downloadable(&self) -> bool {
        self.status == FileStatus::Ok
    }

    /// Direct download URL on the file's storage server.
    #[must_use]
    pub fn download_url(&self) -> String {
        download_url(
            &self.server_id,
            &self.short_host,
            &self.file_id,
            &self.file_name,
        )
    }
}

/// Builds `https://rs{server_id}{short_host}.rapidshare.com/files/{file_id}/{file_name}`.
#[must_use]
pub fn download_url(server_id: &str, short_host: &str, file_id: &str, file_name: &str) -> String {
    format!("https://rs{server_id}{short_host}.rapidshare.com/files/{file_id}/{file_name}")
}

/// Builds the single `checkfiles` call covering every reference.
///
/// # Errors
///
/// Returns [`ApiError::Caller`] for an empty batch.
pub fn status_call(refs: &[FileReference]) -> Result<ServiceCall, ApiError> {
    if refs.is_empty() {
        return Err(ApiError::caller("file status check needs at least one file"));
    }

    let placeholders = refs.iter().filter(|r| r.is_empty()).count();
    if placeholders > 0 {
        debug!(placeholders, "batch contains links that are not file links");
    }

    let files = refs
        .iter()
        .map(|r| r.file_id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let filenames = refs
        .iter()
        .map(|r| r.file_name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    Ok(ServiceCall::new(CHECK_FILES_SERVICE)
        .param("files", files)
        .param("filenames", filenames)
        .shape(Shape::DelimitedRows))
}

/// Decodes status rows, preserving response order.
#[must_use]
pub fn decode_status_rows(rows: &[Row], requested: usize) -> Vec<FileStatusRecord> {
    if rows.len() != requested {
        warn!(
            requested,
            received = rows.len(),
            "checkfiles returned a different number of rows than files requested"
        );
    }
    rows.iter().map(|row| FileStatusRecord::from_row(row)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::parser::parse_rows;

    const SINGLE_ROW: &str =
        "829628035,HornyRhinos.jpg,272288,370,1,l33,8700146036606454677EFAFB4A2AC52E";

    #[test]
    fn test_file_reference_parse_valid_link() {
        let r = FileReference::parse("https://rapidshare.com/files/829628035/HornyRhinos.jpg");
        assert_eq!(r, FileReference::new("829628035", "HornyRhinos.jpg"));
    }

    #[test]
    fn test_file_reference_parse_http_and_case_insensitive_scheme() {
        let r = FileReference::parse("HTTP://RapidShare.com/files/1/a.zip");
        assert_eq!(r, FileReference::new("1", "a.zip"));
    }

    #[test]
    fn test_file_reference_parse_empty_is_placeholder() {
        let r = FileReference::parse("");
        assert_eq!(r, FileReference::new("", ""));
        assert!(r.is_empty());
    }

    #[test]
    fn test_file_reference_parse_invalid_links_are_placeholders() {
        for url in [
            "http://server/file",
            "ftp://rapidshare.com/files/1/a.zip",
            "https://rapidshare.com/files/abc/a.zip",
            "https://rapidshare.com/files/1/",
            "not a url",
        ] {
            assert!(FileReference::parse(url).is_empty(), "should be placeholder: {url}");
        }
    }

    #[test]
    fn test_is_file_url() {
        assert!(is_file_url(" https://rapidshare.com/files/829628035/HornyRhinos.jpg "));
        assert!(!is_file_url("https://example.com/paper.pdf"));
    }

    #[test]
    fn test_file_status_table() {
        for code in [1, 2, 6] {
            assert_eq!(FileStatus::from_code(code), FileStatus::Ok, "code {code}");
        }
        for code in [0, 3, 4, 5] {
            assert_eq!(FileStatus::from_code(code), FileStatus::Error, "code {code}");
        }
        for code in [-1, 7, 50] {
            assert_eq!(FileStatus::from_code(code), FileStatus::Unknown, "code {code}");
        }
    }

    #[test]
    fn test_file_status_from_non_numeric_field_is_unknown() {
        assert_eq!(FileStatus::from_field(""), FileStatus::Unknown);
        assert_eq!(FileStatus::from_field("ok"), FileStatus::Unknown);
        assert_eq!(FileStatus::from_field(" 1 "), FileStatus::Ok);
    }

    #[test]
    fn test_record_from_row_decodes_every_field() {
        let rows = parse_rows(SINGLE_ROW);
        let record = FileStatusRecord::from_row(&rows[0]);
        assert_eq!(
            record,
            FileStatusRecord {
                file_id: "829628035".into(),
                file_name: "HornyRhinos.jpg".into(),
                file_size: "272288".into(),
                server_id: "370".into(),
                status: FileStatus::Ok,
                short_host: "l33".into(),
                md5: "8700146036606454677EFAFB4A2AC52E".into(),
            }
        );
        assert!(record.is_downloadable());
    }

    #[test]
    fn test_record_from_short_row_fills_empty_fields() {
        let record = FileStatusRecord::from_row(&["1".to_string(), "a.zip".to_string()]);
        assert_eq!(record.file_id, "1");
        assert_eq!(record.md5, "");
        assert_eq!(record.status, FileStatus::Unknown);
    }

    #[test]
    fn test_download_url() {
        let rows = parse_rows(SINGLE_ROW);
        let record = FileStatusRecord::from_row(&rows[0]);
        assert_eq!(
            record.download_url(),
            "https://rs370l33.rapidshare.com/files/829628035/HornyRhinos.jpg"
        );
    }

    #[test]
    fn test_status_call_rejects_empty_batch() {
        let err = status_call(&[]).unwrap_err();
        assert!(matches!(err, ApiError::Caller { .. }), "got {err:?}");
    }

    #[test]
    fn test_status_call_keeps_ids_and_names_aligned() {
        let refs = [
            FileReference::parse("https://rapidshare.com/files/829628035/HornyRhinos.jpg"),
            FileReference::parse("garbage"),
            FileReference::parse("https://rapidshare.com/files/766059293/ElegantElephants.jpg"),
        ];
        let call = status_call(&refs).unwrap();
        assert_eq!(call.service, "checkfiles");
        assert_eq!(call.shape, Shape::DelimitedRows);
        assert_eq!(call.params.get("files"), Some("829628035,,766059293"));
        assert_eq!(
            call.params.get("filenames"),
            Some("HornyRhinos.jpg,,ElegantElephants.jpg")
        );
    }

    #[test]
    fn test_decode_status_rows_preserves_order() {
        let rows = parse_rows("3,c.jpg,1,1,1,a,x\n1,a.jpg,1,1,0,a,y\n2,b.jpg,1,1,1,a,z");
        let records = decode_status_rows(&rows, 3);
        let ids: Vec<&str> = records.iter().map(|r| r.file_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(records[1].status, FileStatus::Error);
    }
}
