//! Configuration loading and work directory resolution
//!
//! Settings are resolved in tiers, highest priority first:
//! 1. Command-line argument / environment variable (handled by the binary)
//! 2. TOML config file
//! 3. OS-dependent compiled default

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default LRCLIB API root
pub const DEFAULT_LYRICS_API_URL: &str = "https://lrclib.net/api";

/// Default timeout for a single lyrics lookup, in seconds
pub const DEFAULT_LYRICS_TIMEOUT_SECS: u64 = 10;

/// Default cap on a single upload, in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: usize = 100;

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// On-disk service configuration
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Directory holding transient uploads
    pub work_dir: Option<PathBuf>,
    /// Root URL of the LRCLIB-compatible lyrics API
    pub lyrics_api_url: Option<String>,
    /// Timeout for one lyrics request
    pub lyrics_timeout_secs: u64,
    /// Largest accepted upload
    pub max_upload_mb: usize,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            lyrics_api_url: None,
            lyrics_timeout_secs: DEFAULT_LYRICS_TIMEOUT_SECS,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Lyrics API root, falling back to the public LRCLIB instance
    pub fn lyrics_api_url(&self) -> &str {
        self.lyrics_api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_LYRICS_API_URL)
    }

    /// Upload cap in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.lyrics_timeout_secs == 0 {
            return Err(Error::Config(
                "lyrics_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_upload_mb == 0 {
            return Err(Error::Config(
                "max_upload_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default configuration file path for the platform
///
/// `~/.config/lyricsmith/lyricsmith-embed.toml` on Linux, the platform
/// equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lyricsmith").join("lyricsmith-embed.toml"))
}

/// Load the TOML configuration
///
/// An explicitly requested file must exist. When no path is given the
/// platform default is tried, and its absence simply yields defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(TomlConfig::default()),
        },
    };

    if !path.exists() {
        if required {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{} ({})", e, path.display())))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate TOML text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    let config: TomlConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Resolve the upload work directory
///
/// Priority: command line / environment, then TOML, then OS default.
pub fn resolve_work_dir(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = &toml_config.work_dir {
        return path.clone();
    }

    get_default_work_dir()
}

/// OS-dependent default work directory
fn get_default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("lyricsmith").join("uploads"))
        .unwrap_or_else(|| PathBuf::from("./uploads"))
}

/// Create the work directory (and parents) if missing
pub fn ensure_work_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Config(format!(
                "Work directory path is not a directory: {}",
                path.display()
            )));
        }
        return Ok(());
    }

    std::fs::create_dir_all(path)?;
    info!("Created work directory: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.lyrics_timeout_secs, 10);
        assert_eq!(config.max_upload_mb, 100);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.lyrics_api_url(), DEFAULT_LYRICS_API_URL);
    }

    #[test]
    fn test_blank_api_url_falls_back() {
        let config = TomlConfig {
            lyrics_api_url: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.lyrics_api_url(), DEFAULT_LYRICS_API_URL);
    }

    #[test]
    fn test_max_upload_bytes() {
        let config = TomlConfig {
            max_upload_mb: 2,
            ..Default::default()
        };
        assert_eq!(config.max_upload_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_cli_work_dir_wins() {
        let config = TomlConfig {
            work_dir: Some(PathBuf::from("/from/toml")),
            ..Default::default()
        };
        let resolved = resolve_work_dir(Some(Path::new("/from/cli")), &config);
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_toml_work_dir_used_without_cli() {
        let config = TomlConfig {
            work_dir: Some(PathBuf::from("/from/toml")),
            ..Default::default()
        };
        assert_eq!(resolve_work_dir(None, &config), PathBuf::from("/from/toml"));
    }

    #[test]
    fn test_default_work_dir_ends_with_uploads() {
        let resolved = resolve_work_dir(None, &TomlConfig::default());
        assert!(resolved.ends_with("uploads"));
    }
}
