//! Reconstructed HTTP responses served from the cache.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use encoding_rs::{Encoding, UTF_8};

use super::entry::CacheEntry;
use super::format::PayloadFormat;
use crate::Error;

/// An HTTP-response-shaped view over a cache row.
///
/// Built the same way on the miss path (from just-computed fields) and
/// the hit path (from stored fields), so callers that expect a response
/// object see identical values either way. Entries stored via the
/// non-response fallback path synthesize a 200 status and no headers.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    url: String,
    status: u16,
    headers: HashMap<String, String>,
    encoding: Option<String>,
    body: Vec<u8>,
}

impl CachedResponse {
    /// Rebuild a response from an entry's stored fields.
    ///
    /// A corrupt header blob is a hard error rather than an empty map:
    /// it indicates the store itself is inconsistent.
    pub(crate) fn rebuild(entry: &CacheEntry) -> Result<Self, Error> {
        let headers = match entry.headers.as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(|e| Error::CorruptEntry {
                request: entry.request.clone(),
                detail: format!("header blob: {e}"),
            })?,
            None => HashMap::new(),
        };

        let body = match entry.format {
            PayloadFormat::Bytes => BASE64.decode(&entry.body).map_err(|e| Error::CorruptEntry {
                request: entry.request.clone(),
                detail: format!("base64 body: {e}"),
            })?,
            _ => {
                let encoding = entry
                    .encoding
                    .as_deref()
                    .and_then(|label| Encoding::for_label(label.as_bytes()))
                    .unwrap_or(UTF_8);
                let (bytes, _, _) = encoding.encode(&entry.body);
                bytes.into_owned()
            }
        };

        Ok(Self {
            url: entry.request.clone(),
            status: entry.status_code.map(|code| code as u16).unwrap_or(200),
            headers,
            encoding: entry.encoding.clone(),
            body,
        })
    }

    /// Final URL, which for cached entries is the request key itself.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded to text per the recorded encoding, UTF-8 by
    /// default, with undecodable sequences replaced.
    pub fn text(&self) -> String {
        let encoding = self
            .encoding
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, Error> {
        serde_json::from_str(&self.text()).map_err(|e| Error::Decode(e.to_string()))
    }
}
