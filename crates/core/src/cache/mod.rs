//! SQLite-backed cache for HTTP fetch results.
//!
//! This module memoizes arbitrary fetch operations against a durable
//! store keyed by the request URL. It supports:
//!
//! - Transparent read-through wrapping of any [`Fetch`] implementation
//! - Heterogeneous payloads (JSON, XML, text, binary) with lossless
//!   round-trips
//! - Two output shapes per lookup: the parsed value, or a
//!   reconstructed HTTP response
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entry;
pub mod fetcher;
pub mod format;
pub mod migrations;
pub mod outcome;
pub mod payload;
pub mod response;
pub mod xml;

pub use crate::Error;

pub use connection::CacheDb;
pub use entry::CacheEntry;
pub use fetcher::{CachedFetcher, Fetch, FetchOptions};
pub use format::PayloadFormat;
pub use outcome::{FetchOutcome, RawResponse};
pub use payload::Payload;
pub use response::CachedResponse;
pub use xml::XmlElement;
