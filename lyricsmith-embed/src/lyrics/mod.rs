//! Lyrics lookup
//!
//! A [`LyricsSource`] answers "lyrics for artist X, track Y (album Z)".
//! [`resolve`] wraps a source with the service's lookup policy:
//! - no call at all unless both artist and title are known
//! - exactly one attempt, no retries
//! - every failure (transport, timeout, status, decoding) is logged and
//!   reported as "no lyrics"

pub mod lrclib;

pub use lrclib::LrclibClient;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Whether lyrics carry LRC timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsKind {
    /// Time-synchronized (LRC) lyrics
    Synced,
    /// Plain text lyrics
    Plain,
}

impl LyricsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LyricsKind::Synced => "synced",
            LyricsKind::Plain => "plain",
        }
    }
}

/// Lyrics returned by a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLyrics {
    pub text: String,
    pub kind: LyricsKind,
}

impl ResolvedLyrics {
    /// Prefer synced lyrics, fall back to plain; empty strings count as missing
    pub fn choose(synced: Option<String>, plain: Option<String>) -> Option<Self> {
        if let Some(text) = synced.filter(|s| !s.is_empty()) {
            return Some(Self {
                text,
                kind: LyricsKind::Synced,
            });
        }
        plain.filter(|s| !s.is_empty()).map(|text| Self {
            text,
            kind: LyricsKind::Plain,
        })
    }
}

/// Lookup key, matched exactly by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LyricsQuery<'a> {
    pub artist: &'a str,
    pub title: &'a str,
    pub album: Option<&'a str>,
}

/// Lyrics lookup errors
#[derive(Debug, Error)]
pub enum LyricsError {
    /// Connection failure or timeout
    #[error("Lyrics request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with an unexpected status
    #[error("Lyrics service returned status {0}")]
    Status(reqwest::StatusCode),

    /// Response body was not the expected JSON object
    #[error("Failed to decode lyrics response: {0}")]
    Decode(String),
}

impl LyricsError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LyricsError::Transport(e) if e.is_timeout())
    }
}

/// A remote (or stubbed) lyrics provider
#[async_trait]
pub trait LyricsSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Single lookup; `Ok(None)` means the source has nothing for this track
    async fn fetch(&self, query: &LyricsQuery<'_>) -> Result<Option<ResolvedLyrics>, LyricsError>;
}

/// Look up lyrics, absorbing every failure into `None`
pub async fn resolve(
    source: &dyn LyricsSource,
    artist: Option<&str>,
    title: Option<&str>,
    album: Option<&str>,
) -> Option<ResolvedLyrics> {
    let artist = artist.filter(|a| !a.is_empty());
    let title = title.filter(|t| !t.is_empty());
    let (Some(artist), Some(title)) = (artist, title) else {
        debug!(
            artist = ?artist,
            title = ?title,
            "Skipping lyrics lookup, artist and title are both required"
        );
        return None;
    };

    let query = LyricsQuery {
        artist,
        title,
        album: album.filter(|a| !a.is_empty()),
    };

    match source.fetch(&query).await {
        Ok(Some(lyrics)) => {
            info!(
                source = source.name(),
                artist = %artist,
                title = %title,
                kind = lyrics.kind.as_str(),
                "Lyrics found"
            );
            Some(lyrics)
        }
        Ok(None) => {
            info!(source = source.name(), artist = %artist, title = %title, "No lyrics available");
            None
        }
        Err(e) if e.is_timeout() => {
            warn!(source = source.name(), artist = %artist, title = %title, "Lyrics lookup timed out");
            None
        }
        Err(e) => {
            warn!(
                source = source.name(),
                artist = %artist,
                title = %title,
                error = %e,
                "Lyrics lookup failed"
            );
            None
        }
    }
}
