//! Last.fm artist statistics.
//!
//! Last.fm serializes numbers as strings; the typed layer converts them
//! and keeps only the fields the research flows use.

use chorus_core::{CachedFetcher, Fetch};
use serde::Deserialize;
use url::Url;

use super::SourceError;

const LASTFM_ROOT: &str = "https://ws.audioscrobbler.com/2.0/";

/// A similar artist, cleaned up.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarArtist {
    pub name: String,
    pub mbid: Option<String>,
    pub similarity: f64,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistsEnvelope {
    similarartists: SimilarArtistsBlock,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistsBlock {
    #[serde(default)]
    artist: Vec<RawSimilarArtist>,
}

#[derive(Debug, Deserialize)]
struct RawSimilarArtist {
    name: String,
    #[serde(default)]
    mbid: Option<String>,
    #[serde(rename = "match")]
    similarity: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistInfoEnvelope {
    artist: ArtistInfo,
}

#[derive(Debug, Deserialize)]
struct ArtistInfo {
    stats: ArtistStats,
}

#[derive(Debug, Deserialize)]
struct ArtistStats {
    listeners: String,
}

/// Last.fm lookups through the response cache.
pub struct LastfmClient<F> {
    fetch: CachedFetcher<F>,
    api_key: String,
}

impl<F: Fetch> LastfmClient<F> {
    pub fn new(fetch: CachedFetcher<F>, api_key: impl Into<String>) -> Self {
        Self { fetch, api_key: api_key.into() }
    }

    /// Artists similar to the given MusicBrainz id.
    pub async fn similar_artists(&self, mbid: &str, limit: u32) -> Result<Vec<SimilarArtist>, SourceError> {
        let url = self.method_url("artist.getsimilar", &[("mbid", mbid), ("limit", &limit.to_string())])?;
        let payload = self.fetch.get(&url).await?;
        let value = payload
            .into_json()
            .ok_or_else(|| SourceError::Shape("artist.getsimilar did not return JSON".to_string()))?;
        let envelope: SimilarArtistsEnvelope = serde_json::from_value(value)?;

        envelope
            .similarartists
            .artist
            .into_iter()
            .map(|raw| {
                let similarity = raw.similarity.parse::<f64>().map_err(|_| {
                    SourceError::Shape(format!(
                        "non-numeric match score {:?} for {}",
                        raw.similarity, raw.name
                    ))
                })?;
                Ok(SimilarArtist { name: raw.name, mbid: raw.mbid, similarity, url: raw.url })
            })
            .collect()
    }

    /// Listener count for an artist name.
    ///
    /// Queried by name rather than mbid; mbid lookups are unreliable
    /// for names like "Be'lakor".
    pub async fn listener_count(&self, artist: &str) -> Result<u64, SourceError> {
        let url = self.method_url("artist.getinfo", &[("artist", artist)])?;
        let payload = self.fetch.get(&url).await?;
        let value = payload
            .into_json()
            .ok_or_else(|| SourceError::Shape("artist.getinfo did not return JSON".to_string()))?;
        let envelope: ArtistInfoEnvelope = serde_json::from_value(value)?;

        let listeners = &envelope.artist.stats.listeners;
        listeners
            .parse::<u64>()
            .map_err(|_| SourceError::Shape(format!("non-numeric listener count {listeners:?}")))
    }

    fn method_url(&self, method: &str, params: &[(&str, &str)]) -> Result<String, SourceError> {
        let mut url = Url::parse(LASTFM_ROOT)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("method", method);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("api_key", &self.api_key).append_pair("format", "json");
        }
        Ok(url.into())
    }
}
