//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API serving synchronized (LRC) and plain lyrics.
//!
//! # API Reference
//! - Endpoint: `GET {base}/get?artist_name=..&track_name=..[&album_name=..]`
//! - Documentation: https://lrclib.net/docs
//! - 200 with a track object, 404 when no track matches

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{LyricsError, LyricsQuery, LyricsSource, ResolvedLyrics};

/// User-Agent header (LRCLIB asks clients to identify themselves)
const USER_AGENT: &str = concat!("lyricsmith-embed/", env!("CARGO_PKG_VERSION"));

/// LRCLIB track object (only the fields used here)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LrclibTrack {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
}

impl LrclibTrack {
    pub fn into_lyrics(self) -> Option<ResolvedLyrics> {
        ResolvedLyrics::choose(self.synced_lyrics, self.plain_lyrics)
    }
}

/// LRCLIB client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    http_client: Client,
    base_url: String,
}

impl LrclibClient {
    /// Create a client for the API rooted at `base_url` (e.g. `https://lrclib.net/api`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LyricsError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LyricsSource for LrclibClient {
    fn name(&self) -> &'static str {
        "LRCLIB"
    }

    async fn fetch(&self, query: &LyricsQuery<'_>) -> Result<Option<ResolvedLyrics>, LyricsError> {
        let url = format!("{}/get", self.base_url);

        let mut params = vec![("artist_name", query.artist), ("track_name", query.title)];
        if let Some(album) = query.album {
            params.push(("album_name", album));
        }

        debug!(url = %url, artist = %query.artist, title = %query.title, album = ?query.album, "Querying LRCLIB");

        let response = self.http_client.get(&url).query(&params).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(LyricsError::Status(status));
        }

        let body = response.bytes().await?;
        let track: LrclibTrack =
            serde_json::from_slice(&body).map_err(|e| LyricsError::Decode(e.to_string()))?;

        debug!(id = ?track.id, "LRCLIB track received");
        Ok(track.into_lyrics())
    }
}
