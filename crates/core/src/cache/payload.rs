//! Parsed payload values and body decoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::format::PayloadFormat;
use super::xml::XmlElement;
use crate::Error;

/// A cached body decoded into its parsed domain shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON document.
    Json(serde_json::Value),
    /// Parsed XML document root.
    Xml(XmlElement),
    /// Plain text, unchanged.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Payload {
    /// Decode a stored body per its format tag.
    ///
    /// The tag axis is total (unknown tags were already normalized to
    /// text on read), but a body that contradicts its tag, such as
    /// corrupt JSON or invalid base64, fails loudly.
    pub fn decode(body: &str, format: PayloadFormat) -> Result<Self, Error> {
        match format {
            PayloadFormat::Json => {
                let value = serde_json::from_str(body).map_err(|e| Error::Decode(e.to_string()))?;
                Ok(Payload::Json(value))
            }
            PayloadFormat::Xml => Ok(Payload::Xml(XmlElement::parse(body)?)),
            PayloadFormat::Text => Ok(Payload::Text(body.to_string())),
            PayloadFormat::Bytes => {
                let bytes = BASE64.decode(body).map_err(|e| Error::Decode(e.to_string()))?;
                Ok(Payload::Bytes(bytes))
            }
        }
    }

    /// The JSON value, if this payload is JSON.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            Payload::Xml(element) => Some(element),
            _ => None,
        }
    }
}
