//! Request-scoped transient upload storage
//!
//! Every upload gets its own directory `<work_dir>/<uuid>/<file name>`, so
//! concurrent uploads sharing a filename never collide. The directory is
//! removed when the [`TransientAsset`] is dropped, on every exit path.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Longest stored filename, in bytes
const MAX_FILE_NAME_LEN: usize = 255;

/// Reduce a client-supplied filename to a safe single path component
///
/// Directory parts (either separator) and control characters are dropped.
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.len() <= MAX_FILE_NAME_LEN {
        return usable(cleaned).map(str::to_string);
    }

    // Keep the extension when shortening. Cut points may land on whitespace,
    // which is trimmed again so that sanitizing is idempotent.
    match Path::new(cleaned).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.len() + 1 < MAX_FILE_NAME_LEN => {
            let stem = truncate(cleaned, MAX_FILE_NAME_LEN - ext.len() - 1).trim_end();
            usable(stem).map(|stem| format!("{}.{}", stem, ext))
        }
        _ => usable(truncate(cleaned, MAX_FILE_NAME_LEN).trim_end()).map(str::to_string),
    }
}

/// Longest prefix of `s` within `max` bytes, on a char boundary
fn truncate(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn usable(name: &str) -> Option<&str> {
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// An uploaded file owned by exactly one request
#[derive(Debug)]
pub struct TransientAsset {
    dir: PathBuf,
    path: PathBuf,
    file_name: String,
}

impl TransientAsset {
    /// Persist `bytes` under a fresh request directory
    ///
    /// `file_name` must already be sanitized.
    pub async fn create(work_dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<Self> {
        if sanitize_filename(file_name).as_deref() != Some(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe upload file name: {:?}", file_name),
            ));
        }

        let dir = work_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir(&dir).await?;

        // Guard owns the directory from here on, so a failed write cleans up too
        let asset = Self {
            path: dir.join(file_name),
            dir,
            file_name: file_name.to_string(),
        };
        tokio::fs::write(&asset.path, bytes).await?;

        debug!(
            file = %asset.path.display(),
            bytes = bytes.len(),
            "Stored transient upload"
        );
        Ok(asset)
    }

    /// Full path of the stored file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sanitized upload filename
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Request directory holding the file
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

// Removal is synchronous even on async workers: the directory must be gone
// once the guard is, and it only ever holds the single upload.
impl Drop for TransientAsset {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = %self.dir.display(), "Removed transient upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                dir = %self.dir.display(),
                error = %e,
                "Failed to remove transient upload"
            ),
        }
    }
}
