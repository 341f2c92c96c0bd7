//! ocd-frontend library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and
//! the binary entry point in `main.rs` share the same module tree.
//!
//! # What does ocd-frontend do?
//!
//! It is the interactive half of a two-process setup:
//!
//! 1. It spawns and supervises the `openocd` debug server (started with
//!    `-f <config>`), relaying the server's own output.
//! 2. It holds a TCP connection to the server's telnet console and relays
//!    responses, sanitized for display.
//! 3. It turns short console actions (`:halt`, `:flashload fw.elf`, ...) into
//!    the debugger command lines a SAM7 operator would otherwise type by
//!    hand, filling in addresses and templates from the command
//!    configuration file.
//! 4. Anything not starting with `:` is passed to the telnet console
//!    verbatim, so the full OpenOCD command language stays reachable.

/// Application layer: console grammar and command dispatch.
pub mod application;

/// Infrastructure layer: telnet channel, server process, storage, session state.
pub mod infrastructure;
