//! Test Helper Utilities
//!
//! Shared fixtures for lyricsmith-embed integration tests: tiny MP3/FLAC
//! files, a multipart request builder, a stub lyrics source and a mock
//! LRCLIB server.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use id3::{Tag, TagLike, Version};
use lyricsmith_embed::lyrics::{LyricsError, LyricsQuery, LyricsSource, ResolvedLyrics};
use lyricsmith_embed::pipeline::LyricsPipeline;
use lyricsmith_embed::tags::FormatRegistry;
use lyricsmith_embed::{build_router, AppState};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Audio fixtures
// ============================================================================

/// A single MPEG frame header padded with silence; enough for ID3 handling
pub fn untagged_mp3_bytes() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFB, 0x90, 0x64];
    bytes.extend(std::iter::repeat(0u8).take(413));
    bytes
}

/// MP3 bytes prefixed with an ID3v2.4 tag carrying the given fields
pub fn tagged_mp3_bytes(artist: Option<&str>, title: Option<&str>, album: Option<&str>) -> Vec<u8> {
    let mut tag = Tag::new();
    if let Some(artist) = artist {
        tag.set_artist(artist);
    }
    if let Some(title) = title {
        tag.set_title(title);
    }
    if let Some(album) = album {
        tag.set_album(album);
    }

    let mut bytes = Vec::new();
    tag.write_to(&mut bytes, Version::Id3v24).unwrap();
    bytes.extend(untagged_mp3_bytes());
    bytes
}

/// `fLaC` marker plus a lone STREAMINFO block (44.1 kHz, stereo, 16 bit)
pub fn minimal_flac_bytes() -> Vec<u8> {
    let mut bytes = b"fLaC".to_vec();
    // Last-metadata-block flag set, type 0 (STREAMINFO), length 34
    bytes.extend([0x80, 0x00, 0x00, 0x22]);
    // Min/max block size 4096
    bytes.extend([0x10, 0x00, 0x10, 0x00]);
    // Min/max frame size unknown
    bytes.extend([0x00; 6]);
    // Sample rate 44100 (20 bits), 2 channels, 16 bits per sample, 0 samples
    bytes.extend([0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x00, 0x00, 0x00]);
    // MD5 of the (absent) audio
    bytes.extend([0x00; 16]);
    bytes
}

/// Write a minimal FLAC file with the given Vorbis comments
pub fn write_tagged_flac(path: &Path, comments: &[(&str, &str)]) {
    use lofty::config::WriteOptions;
    use lofty::ogg::VorbisComments;
    use lofty::tag::TagExt;

    std::fs::write(path, minimal_flac_bytes()).unwrap();
    if comments.is_empty() {
        return;
    }

    let mut vorbis = VorbisComments::default();
    for (key, value) in comments {
        vorbis.insert(key.to_string(), value.to_string());
    }
    vorbis.save_to_path(path, WriteOptions::default()).unwrap();
}

// ============================================================================
// Multipart requests
// ============================================================================

pub const BOUNDARY: &str = "lyricsmith-test-boundary";

/// Builds `multipart/form-data` requests for POST /process
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend(format!("--{}\r\n", BOUNDARY).as_bytes());
        self.body.extend(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        self.body.extend(value.as_bytes());
        self.body.extend(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend(format!("--{}\r\n", BOUNDARY).as_bytes());
        self.body.extend(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        self.body.extend(b"Content-Type: application/octet-stream\r\n\r\n");
        self.body.extend(bytes);
        self.body.extend(b"\r\n");
        self
    }

    pub fn build(mut self) -> Request<Body> {
        self.body.extend(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Request::builder()
            .method("POST")
            .uri("/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

// ============================================================================
// Lyrics stubs
// ============================================================================

/// Lookup key as seen by the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenQuery {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
}

/// In-process lyrics source with a canned answer
pub struct StubLyrics {
    response: Option<ResolvedLyrics>,
    calls: AtomicUsize,
    queries: Mutex<Vec<SeenQuery>>,
}

impl StubLyrics {
    pub fn returning(response: Option<ResolvedLyrics>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<SeenQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LyricsSource for StubLyrics {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn fetch(&self, query: &LyricsQuery<'_>) -> Result<Option<ResolvedLyrics>, LyricsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(SeenQuery {
            artist: query.artist.to_string(),
            title: query.title.to_string(),
            album: query.album.map(str::to_string),
        });
        Ok(self.response.clone())
    }
}

// ============================================================================
// Mock LRCLIB server
// ============================================================================

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    delay: Duration,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Handle to a running mock LRCLIB server
pub struct MockLrclib {
    /// API root to hand to `LrclibClient::new`
    pub base_url: String,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl MockLrclib {
    /// Decoded query parameters of every request received so far
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }
}

async fn mock_get(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(params);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// Start a mock `GET /api/get` answering every request with `status` + `body`
pub async fn spawn_mock_lrclib(status: StatusCode, body: &str, delay: Duration) -> MockLrclib {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body: body.to_string(),
        delay,
        requests: Arc::clone(&requests),
    };

    let app = Router::new()
        .route("/api/get", get(mock_get))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockLrclib {
        base_url: format!("http://{}/api", addr),
        requests,
    }
}

// ============================================================================
// Application
// ============================================================================

/// Router wired to `lyrics`, storing uploads under `work_dir`
pub fn test_app(work_dir: &Path, lyrics: Arc<dyn LyricsSource>) -> Router {
    test_app_with_limit(work_dir, lyrics, 16 * 1024 * 1024)
}

pub fn test_app_with_limit(
    work_dir: &Path,
    lyrics: Arc<dyn LyricsSource>,
    max_upload_bytes: usize,
) -> Router {
    let pipeline = LyricsPipeline::new(
        Arc::new(FormatRegistry::with_defaults()),
        lyrics,
        work_dir.to_path_buf(),
    );
    build_router(AppState::new(pipeline, max_upload_bytes))
}

/// Number of entries left in the work directory
pub fn work_dir_entries(work_dir: &Path) -> usize {
    std::fs::read_dir(work_dir).unwrap().count()
}
