//! On-disk storage for the frontend.
//!
//! Three unrelated files live here:
//!
//! - **Settings** (`settings.toml` in the platform config directory):
//!   telnet address, openocd binary, default file selections, log level.
//!   Absent file means defaults, so the frontend runs out of the box.
//! - **Recent-directory cache**: a single line of text in the temp
//!   directory, read at startup and rewritten at shutdown. Bare filenames
//!   typed at the console are resolved against it. Failures around this file
//!   are ignored; losing the cache only costs convenience.
//! - **Server config**: the text of the `-f` file handed to openocd, read
//!   whole for display.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for settings and server-config file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings TOML could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Settings schema ───────────────────────────────────────────────────────────

/// Frontend settings stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Telnet console address, `host:port`.
    #[serde(default = "default_console_addr")]
    pub console_addr: String,
    /// Path of the openocd binary.
    #[serde(default = "default_openocd_binary")]
    pub openocd_binary: PathBuf,
    /// Server config file handed to openocd with `-f`, if preselected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_config: Option<PathBuf>,
    /// Command configuration file loaded at startup, if preselected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_config: Option<PathBuf>,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_console_addr() -> String {
    // OpenOCD's stock telnet console port.
    "localhost:4444".to_string()
}
fn default_openocd_binary() -> PathBuf {
    PathBuf::from("/usr/bin/openocd")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console_addr: default_console_addr(),
            openocd_binary: default_openocd_binary(),
            server_config: None,
            command_config: None,
            log_level: default_log_level(),
        }
    }
}

// ── Settings repository ───────────────────────────────────────────────────────

/// Resolves the full path of the settings file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn settings_file_path() -> Result<PathBuf, StorageError> {
    platform_config_dir()
        .map(|dir| dir.join("settings.toml"))
        .ok_or(StorageError::NoPlatformConfigDir)
}

/// Loads the settings, returning `Settings::default()` if the file does not
/// yet exist.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system errors other than "not
/// found" and [`StorageError::Parse`] if the TOML is malformed.
pub fn load_settings() -> Result<Settings, StorageError> {
    let path = settings_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no settings at {}; using defaults", path.display());
            Ok(Settings::default())
        }
        Err(e) => Err(StorageError::Io { path, source: e }),
    }
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("OcdFrontend"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("ocd-frontend"))
    }
}

// ── Recent-directory cache ────────────────────────────────────────────────────

/// Location of the recent-directory cache file.
fn recent_dir_file() -> PathBuf {
    std::env::temp_dir().join("ocd-frontend-recentdir.dat")
}

/// Reads the cached recent directory. `None` when the cache is missing,
/// unreadable, or empty.
pub fn load_recent_dir() -> Option<PathBuf> {
    let text = std::fs::read_to_string(recent_dir_file()).ok()?;
    let first = text.lines().next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(PathBuf::from(first))
    }
}

/// Overwrites the recent-directory cache. Failures are ignored.
pub fn store_recent_dir(dir: &Path) {
    let _ = std::fs::write(recent_dir_file(), format!("{}\n", dir.display()));
}

// ── Server config ─────────────────────────────────────────────────────────────

/// Reads the whole text of the openocd `-f` config file for display.
///
/// # Errors
///
/// Returns [`StorageError::Io`] when the file cannot be read.
pub fn read_server_config(path: &Path) -> Result<String, StorageError> {
    std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_points_at_local_console() {
        let settings = Settings::default();
        assert_eq!(settings.console_addr, "localhost:4444");
        assert_eq!(settings.openocd_binary, PathBuf::from("/usr/bin/openocd"));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_settings_toml_round_trip() {
        // Arrange
        let mut settings = Settings::default();
        settings.console_addr = "192.168.0.7:4444".to_string();
        settings.server_config = Some(PathBuf::from("/boards/sam7s256.cfg"));

        // Act
        let text = toml::to_string_pretty(&settings).expect("serialize");
        let restored: Settings = toml::from_str(&text).expect("deserialize");

        // Assert
        assert_eq!(settings, restored);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let settings: Settings = toml::from_str("").expect("deserialize empty");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let settings: Settings =
            toml::from_str("log_level = \"debug\"\n").expect("deserialize partial");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.console_addr, "localhost:4444");
    }

    #[test]
    fn test_none_paths_are_omitted_from_toml() {
        let text = toml::to_string_pretty(&Settings::default()).expect("serialize");
        assert!(!text.contains("server_config"));
        assert!(!text.contains("command_config"));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result: Result<Settings, toml::de::Error> = toml::from_str("[[[ nope");
        assert!(result.is_err());
    }

    #[test]
    fn test_recent_dir_round_trip() {
        let dir = PathBuf::from("/home/user/firmware");
        store_recent_dir(&dir);
        assert_eq!(load_recent_dir(), Some(dir));
    }

    #[test]
    fn test_read_server_config_missing_file_is_io_error() {
        let err = read_server_config(Path::new("/nonexistent/board.cfg")).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn test_settings_file_path_ends_with_settings_toml() {
        if let Ok(path) = settings_file_path() {
            assert!(path.ends_with("settings.toml"));
        }
        // NoPlatformConfigDir in a stripped environment is acceptable.
    }
}
