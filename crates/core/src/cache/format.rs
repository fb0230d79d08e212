//! Payload format tags and Content-Type classification.

use tracing::warn;

/// How a cached body is encoded, and therefore how it must be decoded.
///
/// Textual formats store the body as UTF-8 text; `Bytes` stores it
/// base64-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Xml,
    Text,
    Bytes,
}

impl PayloadFormat {
    /// Classify a Content-Type header value.
    ///
    /// Precedence: "json" anywhere in the type wins, then "xml", then
    /// any "text/" type. Unknown types are opaque bytes; a missing or
    /// empty header is treated as text.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(ct) = content_type else {
            return PayloadFormat::Text;
        };
        let ct = ct.to_ascii_lowercase();
        if ct.trim().is_empty() {
            PayloadFormat::Text
        } else if ct.contains("json") {
            PayloadFormat::Json
        } else if ct.contains("xml") {
            PayloadFormat::Xml
        } else if ct.starts_with("text/") {
            PayloadFormat::Text
        } else {
            PayloadFormat::Bytes
        }
    }

    /// The tag stored in the `format` column.
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadFormat::Json => "json",
            PayloadFormat::Xml => "xml",
            PayloadFormat::Text => "text",
            PayloadFormat::Bytes => "bytes",
        }
    }

    /// Parse a stored tag. Unrecognized or missing tags fall back to
    /// text so stale rows stay readable.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("json") => PayloadFormat::Json,
            Some("xml") => PayloadFormat::Xml,
            Some("text") => PayloadFormat::Text,
            Some("bytes") => PayloadFormat::Bytes,
            Some(other) => {
                warn!(tag = other, "unrecognized format tag, treating as text");
                PayloadFormat::Text
            }
            None => PayloadFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(
            PayloadFormat::from_content_type(Some("application/json")),
            PayloadFormat::Json
        );
        assert_eq!(
            PayloadFormat::from_content_type(Some("text/html; charset=utf-8")),
            PayloadFormat::Text
        );
        assert_eq!(PayloadFormat::from_content_type(Some("application/xml")), PayloadFormat::Xml);
        assert_eq!(PayloadFormat::from_content_type(None), PayloadFormat::Text);
        assert_eq!(
            PayloadFormat::from_content_type(Some("application/octet-stream")),
            PayloadFormat::Bytes
        );
    }

    #[test]
    fn test_json_wins_over_text_prefix() {
        // Last.fm-style responses that declare a charset still map on
        // the json keyword.
        assert_eq!(
            PayloadFormat::from_content_type(Some("application/json; charset=utf-8")),
            PayloadFormat::Json
        );
        assert_eq!(PayloadFormat::from_content_type(Some("text/json")), PayloadFormat::Json);
    }

    #[test]
    fn test_empty_content_type_is_text() {
        assert_eq!(PayloadFormat::from_content_type(Some("")), PayloadFormat::Text);
    }

    #[test]
    fn test_tag_round_trip() {
        for format in [
            PayloadFormat::Json,
            PayloadFormat::Xml,
            PayloadFormat::Text,
            PayloadFormat::Bytes,
        ] {
            assert_eq!(PayloadFormat::from_tag(Some(format.as_str())), format);
        }
    }

    #[test]
    fn test_unknown_tag_falls_back_to_text() {
        assert_eq!(PayloadFormat::from_tag(Some("csv")), PayloadFormat::Text);
        assert_eq!(PayloadFormat::from_tag(None), PayloadFormat::Text);
    }
}
