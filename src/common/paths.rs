//! Configuration and log paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/regress/` and `~/.local/share/regress/logs/`
//! - macOS: `~/Library/Application Support/regress/`
//! - Windows: `%APPDATA%\regress\`

use std::io;
use std::path::{Path, PathBuf};

/// Application name used for platform directories
const APP_NAME: &str = "regress";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Default directory for per-stage log files
///
/// Falls back to `./logs` when no home directory can be determined.
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Ensure the parent directory of a file exists
pub async fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::create_dir_all(dir).await,
        _ => Ok(()),
    }
}
