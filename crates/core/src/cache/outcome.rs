//! Fetch result classification and serialization.
//!
//! What an underlying fetch hands back is one of four explicit shapes;
//! each shape serializes to a `(body, format)` pair for storage.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use encoding_rs::{Encoding, UTF_8};

use super::format::PayloadFormat;

/// A captured HTTP response, reduced to the fields the cache persists.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, collapsed to strings.
    pub headers: HashMap<String, String>,
    /// Character encoding label (e.g. "utf-8"), usually the charset
    /// parameter of the Content-Type header.
    pub encoding: Option<String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Case-insensitive Content-Type lookup.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }

    /// Body decoded to text. The recorded encoding is authoritative;
    /// unrecognized labels fall back to UTF-8, and undecodable
    /// sequences are replaced.
    pub fn body_text(&self) -> String {
        let encoding = self
            .encoding
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }
}

/// What an underlying fetch produced, classified for storage.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// An HTTP-response-shaped result.
    Response(RawResponse),
    /// A mapping/sequence (or other JSON) value.
    Structured(serde_json::Value),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Anything else, kept in string form. The declared content type,
    /// when present, only influences the stored format tag.
    Other {
        text: String,
        content_type: Option<String>,
    },
}

impl FetchOutcome {
    /// Serialize to the stored `(body, format)` pair.
    ///
    /// Structured values are stored as JSON text whatever a declared
    /// content type says; the `Other` arm is string coercion and may be
    /// lossy.
    pub(crate) fn encode(&self) -> (String, PayloadFormat) {
        match self {
            FetchOutcome::Response(response) => {
                let format = PayloadFormat::from_content_type(response.content_type());
                let body = match format {
                    PayloadFormat::Bytes => BASE64.encode(&response.body),
                    _ => response.body_text(),
                };
                (body, format)
            }
            FetchOutcome::Structured(value) => (value.to_string(), PayloadFormat::Json),
            FetchOutcome::Binary(bytes) => (BASE64.encode(bytes), PayloadFormat::Bytes),
            FetchOutcome::Other { text, content_type } => {
                let json_declared = content_type
                    .as_deref()
                    .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
                let format = if json_declared { PayloadFormat::Json } else { PayloadFormat::Text };
                (text.clone(), format)
            }
        }
    }
}
