//! lyricsmith-embed library interface
//!
//! Exposes the router, pipeline and tag/lyrics components for the binary and
//! for integration testing.

pub mod api;
pub mod error;
pub mod lyrics;
pub mod pipeline;
pub mod tags;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::pipeline::LyricsPipeline;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Upload processing pipeline
    pub pipeline: LyricsPipeline,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: LyricsPipeline, max_upload_bytes: usize) -> Self {
        Self {
            pipeline,
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::process_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
