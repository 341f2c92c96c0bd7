//! Infrastructure layer for the console frontend.
//!
//! Contains everything that touches the OS: the telnet socket, the openocd
//! child process, files on disk, and the session state shown to the user.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `ocd_core`, but MUST NOT be imported by the application layer.
//!
//! # Sub-modules
//!
//! - **`network`** – TCP connection to the OpenOCD telnet console. Inbound
//!   bytes are IAC-filtered and sanitized, then forwarded to the event loop
//!   as [`network::TelnetEvent`]s.
//!
//! - **`process`** – Spawns `openocd -f <config>` with piped output and
//!   relays its stdout/stderr as [`process::ServerEvent`]s. Stopping asks
//!   nicely first and kills after a one-second grace period.
//!
//! - **`storage`** – Frontend settings (TOML), the recent-directory cache,
//!   and reading the server config file for display.
//!
//! - **`ui_bridge`** – The session state the console surfaces to the user:
//!   image selections, erase flag, connection status, active config paths.

pub mod network;
pub mod process;
pub mod storage;
pub mod ui_bridge;
