//! Tag container access (read identity, embed lyrics)
//!
//! Each supported container family implements [`TagFormat`]. The
//! [`FormatRegistry`] dispatches on the file extension (case-insensitive) so
//! the pipeline never branches on formats itself.
//!
//! Reading is soft-fail: an unsupported extension, a file without a tag, or
//! a parse failure all yield an empty [`TrackTags`]. Writing is hard-fail:
//! an I/O or encoding problem while embedding is returned to the caller.

pub mod flac_format;
pub mod id3_format;

pub use flac_format::FlacFormat;
pub use id3_format::Id3Format;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Tag access errors
#[derive(Debug, Error)]
pub enum TagError {
    /// ID3 read/write failure
    #[error("ID3 error: {0}")]
    Id3(#[from] id3::Error),

    /// FLAC / Vorbis comment read/write failure
    #[error("Tag error: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    /// I/O error (file open)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No registered format handles this file
    #[error("Unsupported format: {0}")]
    Unsupported(String),
}

impl TagError {
    /// True when the file simply carries no tag container
    pub fn is_missing_tag(&self) -> bool {
        matches!(self, TagError::Id3(e) if matches!(e.kind, id3::ErrorKind::NoTag))
    }
}

/// Identity fields read from a file's embedded tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
}

impl TrackTags {
    /// Build from raw tag values; empty strings count as absent
    pub fn from_values(artist: Option<&str>, title: Option<&str>, album: Option<&str>) -> Self {
        Self {
            artist: non_empty(artist),
            title: non_empty(title),
            album: non_empty(album),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artist.is_none() && self.title.is_none() && self.album.is_none()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// A tag container family
///
/// Implementations are synchronous; async callers go through
/// `spawn_blocking`.
pub trait TagFormat: Send + Sync {
    /// Format name for logging
    fn name(&self) -> &'static str;

    /// Lower-case file extensions (without dot) handled by this format
    fn extensions(&self) -> &'static [&'static str];

    /// Read artist/title/album (first value of each)
    fn read_tags(&self, path: &Path) -> Result<TrackTags, TagError>;

    /// Store `lyrics` in the file's tag, creating the tag if needed
    fn embed_lyrics(&self, path: &Path, lyrics: &str) -> Result<(), TagError>;

    /// Read back the lyrics field written by [`TagFormat::embed_lyrics`]
    fn read_lyrics(&self, path: &Path) -> Result<Option<String>, TagError>;
}

/// Extension-keyed set of tag formats
#[derive(Clone, Default)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn TagFormat>>,
}

impl FormatRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in formats (MP3/ID3 and FLAC)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Id3Format::new()));
        registry.register(Arc::new(FlacFormat::new()));
        registry
    }

    /// Register a format for all of its extensions (later registrations win)
    pub fn register(&mut self, format: Arc<dyn TagFormat>) {
        for ext in format.extensions() {
            self.formats.insert(ext.to_ascii_lowercase(), Arc::clone(&format));
        }
    }

    /// Format responsible for `path`, by extension
    pub fn for_path(&self, path: &Path) -> Option<&dyn TagFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.formats.get(&ext).map(|f| f.as_ref())
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.for_path(path).is_some()
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    /// Read identity tags, absorbing every failure into "no metadata"
    pub fn read_tags(&self, path: &Path) -> TrackTags {
        let Some(format) = self.for_path(path) else {
            debug!(file = %path.display(), "No tag reader for extension");
            return TrackTags::default();
        };

        match format.read_tags(path) {
            Ok(tags) => {
                debug!(
                    file = %path.display(),
                    format = format.name(),
                    artist = ?tags.artist,
                    title = ?tags.title,
                    album = ?tags.album,
                    "Read embedded tags"
                );
                tags
            }
            Err(e) if e.is_missing_tag() => {
                debug!(file = %path.display(), format = format.name(), "File has no tag");
                TrackTags::default()
            }
            Err(e) => {
                warn!(
                    file = %path.display(),
                    format = format.name(),
                    error = %e,
                    "Failed to read embedded tags, continuing without them"
                );
                TrackTags::default()
            }
        }
    }

    /// Embed lyrics if the format is supported
    ///
    /// Returns `Ok(false)` without touching the file when no format handles
    /// the extension.
    pub fn embed_lyrics(&self, path: &Path, lyrics: &str) -> Result<bool, TagError> {
        let Some(format) = self.for_path(path) else {
            return Ok(false);
        };
        format.embed_lyrics(path, lyrics)?;
        debug!(
            file = %path.display(),
            format = format.name(),
            bytes = lyrics.len(),
            "Embedded lyrics"
        );
        Ok(true)
    }

    /// Read back embedded lyrics
    pub fn read_lyrics(&self, path: &Path) -> Result<Option<String>, TagError> {
        let format = self
            .for_path(path)
            .ok_or_else(|| TagError::Unsupported(path.display().to_string()))?;
        format.read_lyrics(path)
    }
}
