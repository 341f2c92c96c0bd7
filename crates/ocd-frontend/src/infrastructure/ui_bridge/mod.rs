//! Session state surfaced by the console.
//!
//! Everything the Qt frontend kept in its widgets lives here instead: the
//! selected image files, the erase checkbox, the connection status, and the
//! paths of the two configuration files. The event loop owns the state
//! exclusively and mutates it in response to console actions, so no field
//! needs a lock (the reader tasks talk to the loop only through channels).

use std::path::{Path, PathBuf};

/// Connection status of the telnet console as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No telnet connection.
    Disconnected,
    /// Telnet console established.
    Connected,
}

/// Mutable session state owned by the event loop.
#[derive(Debug)]
pub struct SessionState {
    /// Telnet connection status (mirrors the Connect/Disconnect toggle).
    pub connection_status: ConnectionStatus,
    /// Selected RAM image, if any.
    pub ram_image: Option<PathBuf>,
    /// Selected flash image, if any.
    pub flash_image: Option<PathBuf>,
    /// Erase-before-write flag for flash downloads.
    pub erase_before_write: bool,
    /// Path the command configuration was last loaded from or saved to.
    pub command_config_path: Option<PathBuf>,
    /// Server config file handed to openocd with `-f`.
    pub server_config_path: Option<PathBuf>,
    /// Directory the last user-supplied path lived in; bare filenames are
    /// resolved against it.
    pub recent_dir: Option<PathBuf>,
}

impl SessionState {
    /// Fresh state: disconnected, nothing selected, erase off.
    pub fn new(recent_dir: Option<PathBuf>) -> Self {
        Self {
            connection_status: ConnectionStatus::Disconnected,
            ram_image: None,
            flash_image: None,
            erase_before_write: false,
            command_config_path: None,
            server_config_path: None,
            recent_dir,
        }
    }

    /// Resolves a user-supplied path against the recent directory and
    /// remembers the directory it names for next time.
    pub fn resolve_path(&mut self, path: &Path) -> PathBuf {
        let resolved = if path.is_relative() && path.parent() == Some(Path::new("")) {
            // A bare filename: look for it where the last file came from.
            match &self.recent_dir {
                Some(dir) => dir.join(path),
                None => path.to_path_buf(),
            }
        } else {
            path.to_path_buf()
        };

        if let Some(parent) = resolved.parent() {
            if !parent.as_os_str().is_empty() {
                self.recent_dir = Some(parent.to_path_buf());
            }
        }

        resolved
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
