//! MP3 files: ID3v2 tags via the `id3` crate
//!
//! Lyrics go into a single USLT frame (language `eng`, description
//! `Lyrics`); an existing frame with the same language/description is
//! replaced and other USLT frames are left alone.

use id3::frame::Lyrics;
use id3::{ErrorKind, Tag, TagLike, Version};
use std::path::Path;

use super::{TagError, TagFormat, TrackTags};

/// ISO-639-2 language code written on the USLT frame
pub const LYRICS_LANG: &str = "eng";

/// Content descriptor written on the USLT frame
pub const LYRICS_DESCRIPTION: &str = "Lyrics";

/// ID3v2.4 text frames separate multiple values with NUL; keep the first
fn first_value(text: Option<&str>) -> Option<&str> {
    text.and_then(|t| t.split('\0').next())
}

/// ID3 tag format (MP3)
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3Format;

impl Id3Format {
    pub fn new() -> Self {
        Self
    }
}

impl TagFormat for Id3Format {
    fn name(&self) -> &'static str {
        "ID3"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["mp3"]
    }

    fn read_tags(&self, path: &Path) -> Result<TrackTags, TagError> {
        let tag = Tag::read_from_path(path)?;
        Ok(TrackTags::from_values(
            first_value(tag.artist()),
            first_value(tag.title()),
            first_value(tag.album()),
        ))
    }

    fn embed_lyrics(&self, path: &Path, lyrics: &str) -> Result<(), TagError> {
        // Start fresh when the file has no tag yet
        let mut tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
            Err(e) => return Err(e.into()),
        };

        let _ = tag.add_frame(Lyrics {
            lang: LYRICS_LANG.to_string(),
            description: LYRICS_DESCRIPTION.to_string(),
            text: lyrics.to_string(),
        });

        tag.write_to_path(path, Version::Id3v24)?;
        Ok(())
    }

    fn read_lyrics(&self, path: &Path) -> Result<Option<String>, TagError> {
        let tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let lyrics = tag
            .lyrics()
            .find(|l| l.lang == LYRICS_LANG && l.description == LYRICS_DESCRIPTION)
            .map(|l| l.text.clone());
        Ok(lyrics)
    }
}
