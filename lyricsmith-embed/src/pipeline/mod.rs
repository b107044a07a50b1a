//! Upload → identify → lyrics → embed pipeline
//!
//! Linear, no retries:
//! 1. Received: persist the upload as a [`TransientAsset`]
//! 2. Identified: read embedded tags, merge with form input and filename
//! 3. LyricsSourced: manual lyrics if given, otherwise one remote lookup
//! 4. Embedded: write the lyrics into the file (supported formats only)
//!
//! The asset guard is created in step 1 and travels with the outcome; it
//! deletes the upload whenever it is dropped, whichever way the request ends.

pub mod asset;
pub mod identity;

pub use asset::{sanitize_filename, TransientAsset};
pub use identity::{TrackIdentity, UploadForm};

use axum::body::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::lyrics::{self, LyricsKind, LyricsSource};
use crate::tags::FormatRegistry;

/// Message returned when the request carries no usable file
pub const NO_FILE_MESSAGE: &str = "Error: no file was uploaded";

/// One upload as received from the client
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as sent by the client (unsanitized)
    pub file_name: String,
    pub bytes: Bytes,
    pub form: UploadForm,
}

/// Where the embedded lyrics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsOrigin {
    Manual,
    Synced,
    Plain,
}

impl LyricsOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            LyricsOrigin::Manual => "manual",
            LyricsOrigin::Synced => "synced",
            LyricsOrigin::Plain => "plain",
        }
    }
}

impl From<LyricsKind> for LyricsOrigin {
    fn from(kind: LyricsKind) -> Self {
        match kind {
            LyricsKind::Synced => LyricsOrigin::Synced,
            LyricsKind::Plain => LyricsOrigin::Plain,
        }
    }
}

/// A processed upload ready to be sent back
#[derive(Debug)]
pub struct EmbeddedTrack {
    asset: TransientAsset,
    pub identity: TrackIdentity,
    pub origin: LyricsOrigin,
    /// False when the format has no tag writer and the file is unchanged
    pub embedded: bool,
}

impl EmbeddedTrack {
    pub fn path(&self) -> &Path {
        self.asset.path()
    }

    pub fn file_name(&self) -> &str {
        self.asset.file_name()
    }

    /// Hand over the asset guard (e.g. to a response body)
    pub fn into_asset(self) -> TransientAsset {
        self.asset
    }
}

/// Terminal state of a pipeline run
#[derive(Debug)]
pub enum Outcome {
    /// Lyrics were obtained; the file is ready for download
    Embedded(EmbeddedTrack),
    /// No lyrics could be obtained; the upload is already gone
    NotFound,
}

/// Pipeline dependencies, shared by all requests
#[derive(Clone)]
pub struct LyricsPipeline {
    formats: Arc<FormatRegistry>,
    lyrics: Arc<dyn LyricsSource>,
    work_dir: PathBuf,
}

impl LyricsPipeline {
    pub fn new(
        formats: Arc<FormatRegistry>,
        lyrics: Arc<dyn LyricsSource>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            formats,
            lyrics,
            work_dir: work_dir.into(),
        }
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run one upload through the pipeline
    pub async fn process(&self, upload: Upload) -> ApiResult<Outcome> {
        let file_name = sanitize_filename(&upload.file_name)
            .ok_or_else(|| ApiError::BadRequest(NO_FILE_MESSAGE.to_string()))?;

        // Received
        let asset = TransientAsset::create(&self.work_dir, &file_name, &upload.bytes).await?;

        // Identified
        let tags = {
            let formats = Arc::clone(&self.formats);
            let path = asset.path().to_path_buf();
            tokio::task::spawn_blocking(move || formats.read_tags(&path))
                .await
                .map_err(|e| ApiError::Internal(format!("Tag reader task failed: {}", e)))?
        };
        let identity = TrackIdentity::merge(&upload.form, &tags, &file_name);

        info!(
            file = %file_name,
            artist = ?identity.artist,
            title = ?identity.title,
            album = ?identity.album,
            "Resolved track identity"
        );

        // LyricsSourced
        let sourced = match upload.form.manual_lyrics() {
            Some(text) => Some((text.to_string(), LyricsOrigin::Manual)),
            None => lyrics::resolve(
                self.lyrics.as_ref(),
                identity.artist.as_deref(),
                identity.title.as_deref(),
                identity.album.as_deref(),
            )
            .await
            .map(|found| (found.text, LyricsOrigin::from(found.kind))),
        };

        let Some((text, origin)) = sourced else {
            info!(file = %file_name, "No lyrics obtained");
            return Ok(Outcome::NotFound);
        };

        // Embedded
        let embedded = {
            let formats = Arc::clone(&self.formats);
            let path = asset.path().to_path_buf();
            tokio::task::spawn_blocking(move || formats.embed_lyrics(&path, &text))
                .await
                .map_err(|e| ApiError::Internal(format!("Tag writer task failed: {}", e)))??
        };

        if embedded {
            info!(file = %file_name, source = origin.as_str(), "Lyrics embedded");
        } else {
            warn!(
                file = %file_name,
                supported = ?self.formats.extensions(),
                "No tag writer for this format, returning file unchanged"
            );
        }

        Ok(Outcome::Embedded(EmbeddedTrack {
            asset,
            identity,
            origin,
            embedded,
        }))
    }
}
