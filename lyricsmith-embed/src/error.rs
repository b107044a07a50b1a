//! Error types for lyricsmith-embed
//!
//! Client mistakes (no file, malformed or oversized multipart) answer in
//! plain text. Server-side failures answer with a JSON error body.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::tags::TagError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Multipart body could not be read (400 / 413)
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    /// Writing lyrics into the file failed (500)
    #[error("Failed to embed lyrics: {0}")]
    Embed(#[from] TagError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Multipart(err) => return (err.status(), err.body_text()).into_response(),
            ApiError::Embed(ref err) => {
                tracing::error!(error = %err, "Embedding failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "EMBED_ERROR", self.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
