//! Owned XML document tree.
//!
//! Cached XML bodies are stored as text and parsed back into a small
//! owned element tree on read. The tree keeps element names, attributes
//! in document order, child elements, and directly-contained character
//! data.

use crate::Error;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// A parsed XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    /// Parse a document and return its root element.
    ///
    /// Malformed documents are a decode error; a cached body tagged
    /// `xml` that fails to parse indicates a corrupt body.
    pub fn parse(xml: &str) -> Result<Self, Error> {
        // quick-xml 0.39 splits character data around entity references into
        // separate `GeneralRef` events. Its own text trimming would strip the
        // whitespace that sits next to those references, so trimming is done on
        // each element's accumulated text instead (see `Event::End`).
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(Self::from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let element = Self::from_start(&start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Ok(Event::Text(text)) => {
                    if let Some(open) = stack.last_mut() {
                        let decoded = text.decode().map_err(|e| Error::Decode(e.to_string()))?;
                        let unescaped = quick_xml::escape::unescape(&decoded)
                            .map_err(|e| Error::Decode(e.to_string()))?;
                        open.text.push_str(&unescaped);
                    }
                }
                Ok(Event::GeneralRef(reference)) => {
                    if let Some(open) = stack.last_mut() {
                        let name = reference.decode().map_err(|e| Error::Decode(e.to_string()))?;
                        let raw = format!("&{name};");
                        let resolved = quick_xml::escape::unescape(&raw)
                            .map_err(|e| Error::Decode(e.to_string()))?;
                        open.text.push_str(&resolved);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(open) = stack.last_mut() {
                        open.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::End(_)) => {
                    let mut closed = stack
                        .pop()
                        .ok_or_else(|| Error::Decode("unbalanced close tag".to_string()))?;
                    closed.text = closed.text.trim().to_string();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(closed),
                        None => return Ok(closed),
                    }
                }
                Ok(Event::Eof) => return Err(Error::Decode("no root element".to_string())),
                Ok(_) => {}
                Err(e) => return Err(Error::Decode(e.to_string())),
            }
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, Error> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::Decode(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Decode(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(XmlElement { name, attributes, children: Vec::new(), text: String::new() })
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
