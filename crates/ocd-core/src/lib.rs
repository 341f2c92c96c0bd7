//! # ocd-core
//!
//! Shared library for the OpenOCD console frontend containing the command
//! configuration record, command-string construction, and output sanitizing.
//!
//! This crate is used by the `ocd-frontend` binary. It has zero dependencies
//! on sockets, OS process APIs, or terminal handling.
//!
//! # Architecture overview
//!
//! The frontend drives an OpenOCD debug server for SAM7-family targets over
//! the server's telnet console. Every user action boils down to one or more
//! lines of text sent down that console. This crate defines:
//!
//! - **`domain`** – The [`CommandConfig`] record (the flat `KEY = value...`
//!   configuration file that supplies every command template and register
//!   address) and [`ImageFormat`] detection for RAM/flash image downloads.
//!
//! - **`commands`** – Pure functions that turn a `CommandConfig` plus user
//!   input into the exact command strings OpenOCD expects (`mdw`, `mww`,
//!   `load_image`, `flash write_image ...`).
//!
//! - **`text`** – Sanitizing of server and console output before display:
//!   carriage returns, ANSI escape sequences, and telnet negotiation bytes.

pub mod commands;
pub mod domain;
pub mod text;

// Re-export the most-used types at the crate root so callers can write
// `ocd_core::CommandConfig` instead of `ocd_core::domain::command_config::CommandConfig`.
pub use domain::command_config::{CommandConfig, ConfigError, RegisterWrite};
pub use domain::image::{ImageFormat, ImageFormatError};
pub use text::{sanitize, strip_telnet_iac};
