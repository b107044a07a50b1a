//! Track identity resolution
//!
//! Field precedence, highest first:
//! 1. Non-blank form field supplied with the upload
//! 2. Embedded tag value
//! 3. Title only: the upload's filename without its extension

use std::path::Path;

use crate::tags::TrackTags;

/// Optional text fields sent alongside the uploaded file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub manual_lyrics: Option<String>,
}

impl UploadForm {
    /// Manual lyrics, verbatim, unless missing or whitespace-only
    pub fn manual_lyrics(&self) -> Option<&str> {
        non_blank(self.manual_lyrics.as_deref())
    }
}

/// Artist/title/album used for the lyrics lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackIdentity {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
}

impl TrackIdentity {
    /// Merge form input, embedded tags and the filename
    pub fn merge(form: &UploadForm, tags: &TrackTags, file_name: &str) -> Self {
        let pick = |form_value: &Option<String>, tag_value: &Option<String>| {
            non_blank(form_value.as_deref())
                .map(str::to_string)
                .or_else(|| tag_value.clone())
        };

        let artist = pick(&form.artist, &tags.artist);
        let album = pick(&form.album, &tags.album);
        let title = pick(&form.title, &tags.title).or_else(|| filename_stem(file_name));

        Self {
            artist,
            title,
            album,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `"Song Title.mp3"` → `"Song Title"`
fn filename_stem(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
