//! lyricsmith-embed - Lyrics Embedding Service
//!
//! Accepts an uploaded MP3/FLAC file, works out artist/title/album from the
//! form, the file's tags or its name, fetches lyrics from LRCLIB (or takes
//! them from the form), embeds them into the file's tags and returns the
//! modified file. Uploads never outlive their request.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lyricsmith_common::config::{ensure_work_dir, load_toml_config, resolve_work_dir};
use lyricsmith_embed::lyrics::LrclibClient;
use lyricsmith_embed::pipeline::LyricsPipeline;
use lyricsmith_embed::tags::FormatRegistry;
use lyricsmith_embed::{build_router, AppState};

/// Command-line arguments for lyricsmith-embed
#[derive(Parser, Debug)]
#[command(name = "lyricsmith-embed")]
#[command(about = "Embed lyrics into uploaded MP3/FLAC files")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5001", env = "PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "LYRICSMITH_HOST")]
    host: std::net::IpAddr,

    /// Directory for transient uploads
    #[arg(short, long, env = "LYRICSMITH_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long, env = "LYRICSMITH_CONFIG")]
    config: Option<PathBuf>,

    /// LRCLIB-compatible API root
    #[arg(long, env = "LYRICSMITH_LYRICS_API_URL")]
    lyrics_api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_toml_config(args.config.as_deref()).context("Failed to load config")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &toml_config.logging.level;
                format!(
                    "lyricsmith_embed={level},lyricsmith_common={level},tower_http={level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting lyricsmith-embed (Lyrics Embedding) v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Work directory: CLI/ENV → TOML → OS default
    let work_dir = resolve_work_dir(args.work_dir.as_deref(), &toml_config);
    ensure_work_dir(&work_dir)
        .with_context(|| format!("Failed to initialize work directory {}", work_dir.display()))?;
    info!("Work directory: {}", work_dir.display());

    let lyrics_api_url = args
        .lyrics_api_url
        .unwrap_or_else(|| toml_config.lyrics_api_url().to_string());
    let lyrics_timeout = Duration::from_secs(toml_config.lyrics_timeout_secs);
    let lyrics = LrclibClient::new(lyrics_api_url, lyrics_timeout)
        .context("Failed to create lyrics client")?;
    info!(
        "Lyrics source: {} (timeout {}s)",
        lyrics.base_url(),
        lyrics_timeout.as_secs()
    );

    let formats = FormatRegistry::with_defaults();
    info!("Embedding formats: {}", formats.extensions().join(", "));

    let pipeline = LyricsPipeline::new(Arc::new(formats), Arc::new(lyrics), work_dir);
    let state = AppState::new(pipeline, toml_config.max_upload_bytes());
    let app = build_router(state);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
