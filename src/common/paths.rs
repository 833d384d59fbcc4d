//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/gntp-notify/`
//! - macOS: `~/Library/Application Support/gntp-notify/`
//! - Windows: `%APPDATA%\gntp-notify\`

use std::path::PathBuf;

/// Name of the application directory
const APP_NAME: &str = "gntp-notify";

/// Environment variable that points at an explicit config file
pub const CONFIG_ENV: &str = "GNTP_CONFIG";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `GNTP_CONFIG` takes precedence over the platform location.
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => config_dir().map(|dir| dir.join("config.toml")),
    }
}
