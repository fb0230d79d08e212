//! MusicBrainz artist lookups.

use chorus_core::{CachedFetcher, Fetch};
use serde::Deserialize;
use tracing::warn;
use url::Url;

use super::SourceError;

const MB_ROOT: &str = "https://musicbrainz.org/ws/2/";

/// Artist entry from a MusicBrainz search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, rename = "sort-name")]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ArtistSearchPage {
    #[serde(default)]
    artists: Vec<Artist>,
}

/// MusicBrainz lookups through the response cache.
pub struct MusicBrainzClient<F> {
    fetch: CachedFetcher<F>,
}

impl<F: Fetch> MusicBrainzClient<F> {
    pub fn new(fetch: CachedFetcher<F>) -> Self {
        Self { fetch }
    }

    /// Search artists by name.
    pub async fn search_artists(&self, name: &str) -> Result<Vec<Artist>, SourceError> {
        let url = artist_search_url(name)?;
        let payload = self.fetch.get(&url).await?;
        let value = payload
            .into_json()
            .ok_or_else(|| SourceError::Shape("artist search did not return JSON".to_string()))?;
        let page: ArtistSearchPage = serde_json::from_value(value)?;
        Ok(page.artists)
    }

    /// The artist exactly matching `name`, falling back to the first
    /// search result when there is no exact match.
    pub async fn find_artist(&self, name: &str) -> Result<Artist, SourceError> {
        let artists = self.search_artists(name).await?;
        if let Some(exact) = artists.iter().find(|a| a.name == name) {
            return Ok(exact.clone());
        }
        match artists.into_iter().next() {
            Some(first) => {
                warn!(requested = name, found = %first.name, "no exact artist name match");
                Ok(first)
            }
            None => Err(SourceError::Shape(format!("no artists found for {name:?}"))),
        }
    }

    /// MusicBrainz identifier for an artist name.
    pub async fn artist_mbid(&self, name: &str) -> Result<String, SourceError> {
        Ok(self.find_artist(name).await?.id)
    }
}

fn artist_search_url(name: &str) -> Result<String, SourceError> {
    let mut url = Url::parse(MB_ROOT)?.join("artist/")?;
    url.query_pairs_mut()
        .append_pair("query", &format!("name:\"{name}\""))
        .append_pair("fmt", "json");
    Ok(url.into())
}
