//! Typed lookups over music-metadata APIs.
//!
//! Each source builds the exact request URL (which doubles as the
//! cache key) and goes through the cached fetcher, so repeated lookups
//! never touch the network.

pub mod lastfm;
pub mod musicbrainz;

pub use lastfm::{LastfmClient, SimilarArtist};
pub use musicbrainz::{Artist, MusicBrainzClient};

use thiserror::Error;

/// Errors from the typed source layer.
///
/// A payload that decodes but lacks an expected field is a source
/// error, not a cache failure: the cache stores and returns the
/// document as-is.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cache error: {0}")]
    Cache(#[from] chorus_core::Error),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected payload shape: {0}")]
    Shape(String),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}
