//! HTTP collaborator and typed API sources for chorus.
//!
//! This crate provides the reqwest-backed fetcher that feeds the
//! response cache, plus thin typed clients for the music-metadata APIs
//! the research scripts lean on.

pub mod fetch;
pub mod sources;

pub use fetch::{HttpConfig, HttpFetcher};
pub use sources::{Artist, LastfmClient, MusicBrainzClient, SimilarArtist, SourceError};
