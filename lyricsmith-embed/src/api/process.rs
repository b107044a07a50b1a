//! POST /process: upload a track, get it back with lyrics embedded
//!
//! Multipart fields:
//! - `file` (required, with filename)
//! - `artist`, `title`, `album`, `manual_lyrics` (optional text)
//!
//! Responses:
//! - 200 attachment carrying the original filename
//! - 400 plain text when no file was sent
//! - 404 plain text when no lyrics could be obtained
//! - 500 JSON when embedding failed

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::{EmbeddedTrack, Outcome, Upload, UploadForm, NO_FILE_MESSAGE};
use crate::AppState;

/// Body of the 404 response
pub const NOT_FOUND_MESSAGE: &str =
    "No lyrics were found for this song. Try entering the details manually.";

/// Response header naming the lyrics origin (manual, synced, plain)
pub const LYRICS_SOURCE_HEADER: &str = "x-lyrics-source";

/// Response header telling whether the file was modified
pub const LYRICS_EMBEDDED_HEADER: &str = "x-lyrics-embedded";

/// POST /process
pub async fn process_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let upload = read_upload(multipart).await?;

    match state.pipeline.process(upload).await? {
        Outcome::Embedded(track) => attachment_response(track).await,
        Outcome::NotFound => Ok((StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE).into_response()),
    }
}

/// Drain the multipart body before touching the disk
async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    let mut file = None;
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if file.is_none() {
                    file = Some((file_name, bytes));
                }
            }
            "artist" => form.artist = Some(field.text().await?),
            "title" => form.title = Some(field.text().await?),
            "album" => form.album = Some(field.text().await?),
            "manual_lyrics" => form.manual_lyrics = Some(field.text().await?),
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    let (file_name, bytes) = file
        .filter(|(file_name, _)| !file_name.is_empty())
        .ok_or_else(|| ApiError::BadRequest(NO_FILE_MESSAGE.to_string()))?;

    Ok(Upload {
        file_name,
        bytes,
        form,
    })
}

/// Stream the processed file back as a download
///
/// The asset guard is moved into the body stream, so the upload is deleted
/// once the body has been sent or dropped.
async fn attachment_response(track: EmbeddedTrack) -> ApiResult<Response> {
    let file = tokio::fs::File::open(track.path()).await?;
    let len = file.metadata().await?.len();

    let disposition = content_disposition(track.file_name());
    let origin = track.origin;
    let embedded = track.embedded;
    let asset = track.into_asset();

    let stream = ReaderStream::new(file).map(move |chunk| {
        let _guard = &asset;
        chunk
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, len)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(LYRICS_SOURCE_HEADER, origin.as_str())
        .header(LYRICS_EMBEDDED_HEADER, if embedded { "true" } else { "false" })
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

/// Build upload processing routes
pub fn process_routes() -> Router<AppState> {
    Router::new().route("/process", post(process_upload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("track.mp3"),
            "attachment; filename=\"track.mp3\"; filename*=UTF-8''track.mp3"
        );
    }

    #[test]
    fn test_content_disposition_escapes() {
        let value = content_disposition("Café \"Live\".flac");
        assert!(value.starts_with("attachment; filename=\"Caf_ _Live_.flac\""));
        assert!(value.ends_with("filename*=UTF-8''Caf%C3%A9%20%22Live%22.flac"));
    }
}
