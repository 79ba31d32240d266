//! Response body decoding.
//!
//! The API answers with plain text in one of three ad-hoc formats. The caller
//! picks the format per call with a [`Shape`]; nothing is sniffed from the body.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tracing::trace;

use super::error::ApiError;

/// How a response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// The body as-is.
    #[default]
    Raw,
    /// One row per line, fields separated by commas.
    DelimitedRows,
    /// One `key=value` pair per line.
    KeyValueMap,
}

impl Shape {
    /// Returns the stable selector label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::DelimitedRows => "rows",
            Self::KeyValueMap => "map",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = ApiError;

    /// Accepts the selector labels, plus the historical `none`/`csv`/`hash` aliases.
    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "raw" | "none" => Ok(Self::Raw),
            "rows" | "csv" => Ok(Self::DelimitedRows),
            "map" | "hash" => Ok(Self::KeyValueMap),
            other => Err(ApiError::caller(format!(
                "invalid response shape '{other}' (expected raw, rows or map)"
            ))),
        }
    }
}

/// One row of a delimited response, fields in wire order.
pub type Row = Vec<String>;

/// Ordered `key=value` mapping decoded from a response.
///
/// Keys keep the position of their first occurrence; a repeated key replaces
/// the earlier value. A key with nothing after `=` has no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueMap {
    entries: Vec<(String, Option<String>)>,
}

impl KeyValueMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Returns the value for `key`; `None` when the key is missing or has no value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Returns true when the key is present, with or without a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Serializes back to the wire format, one `key=value` line per entry.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{key}={}", value.unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Serializes as an object in insertion order; keys without a value map to `null`.
impl Serialize for KeyValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedResponse {
    /// Undecoded body.
    Raw(String),
    /// Comma-delimited rows.
    Rows(Vec<Row>),
    /// `key=value` lines.
    Map(KeyValueMap),
}

impl ParsedResponse {
    /// Returns the raw body, if this response was decoded as [`Shape::Raw`].
    #[must_use]
    pub fn into_raw(self) -> Option<String> {
        match self {
            Self::Raw(body) => Some(body),
            _ => None,
        }
    }

    /// Returns the rows, if this response was decoded as [`Shape::DelimitedRows`].
    #[must_use]
    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Returns the map, if this response was decoded as [`Shape::KeyValueMap`].
    #[must_use]
    pub fn into_map(self) -> Option<KeyValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Decodes `body` into the requested shape.
///
/// Never fails: an empty body decodes to an empty value of the requested kind.
#[must_use]
pub fn parse(body: &str, shape: Shape) -> ParsedResponse {
    trace!(shape = %shape, body_len = body.len(), "decoding response");
    match shape {
        Shape::Raw => ParsedResponse::Raw(body.to_string()),
        Shape::DelimitedRows => ParsedResponse::Rows(parse_rows(body)),
        Shape::KeyValueMap => ParsedResponse::Map(parse_key_values(body)),
    }
}

/// Splits a body into rows of comma-separated fields.
#[must_use]
pub fn parse_rows(body: &str) -> Vec<Row> {
    lines(body)
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

/// Splits a body into `key=value` pairs, splitting each line on the first `=`.
#[must_use]
pub fn parse_key_values(body: &str) -> KeyValueMap {
    let mut map = KeyValueMap::new();
    for line in lines(body) {
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key, Some(value).filter(|v| !v.is_empty())),
            None => (line, None),
        };
        map.insert(key, value.map(str::to_string));
    }
    map
}

/// Non-empty lines of the body, with surrounding whitespace removed.
fn lines(body: &str) -> impl Iterator<Item = &str> {
    body.trim().lines().map(str::trim).filter(|line| !line.is_empty())
}
