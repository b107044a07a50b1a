//! FLAC files: Vorbis comments via `lofty`
//!
//! Lyrics are stored under the flat `LYRICS` key.

use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::flac::FlacFile;
use lofty::tag::TagExt;
use std::fs::File;
use std::path::Path;

use super::{TagError, TagFormat, TrackTags};

/// Vorbis comment key holding lyrics
pub const LYRICS_KEY: &str = "LYRICS";

/// FLAC tag format (Vorbis comments)
#[derive(Debug, Default, Clone, Copy)]
pub struct FlacFormat;

impl FlacFormat {
    pub fn new() -> Self {
        Self
    }

    /// Parse only the metadata blocks; stream properties are not needed
    fn open(path: &Path) -> Result<FlacFile, TagError> {
        let mut file = File::open(path)?;
        let flac = FlacFile::read_from(&mut file, ParseOptions::new().read_properties(false))?;
        Ok(flac)
    }
}

impl TagFormat for FlacFormat {
    fn name(&self) -> &'static str {
        "FLAC"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["flac"]
    }

    fn read_tags(&self, path: &Path) -> Result<TrackTags, TagError> {
        let flac = Self::open(path)?;
        let Some(comments) = flac.vorbis_comments() else {
            return Ok(TrackTags::default());
        };

        Ok(TrackTags::from_values(
            comments.get("ARTIST"),
            comments.get("TITLE"),
            comments.get("ALBUM"),
        ))
    }

    fn embed_lyrics(&self, path: &Path, lyrics: &str) -> Result<(), TagError> {
        let flac = Self::open(path)?;
        let mut comments = flac.vorbis_comments().cloned().unwrap_or_default();

        comments.insert(LYRICS_KEY.to_string(), lyrics.to_string());
        comments.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }

    fn read_lyrics(&self, path: &Path) -> Result<Option<String>, TagError> {
        let flac = Self::open(path)?;
        Ok(flac
            .vorbis_comments()
            .and_then(|c| c.get(LYRICS_KEY))
            .map(str::to_string))
    }
}
