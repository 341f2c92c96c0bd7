//! Domain types for the OpenOCD console frontend.
//!
//! Pure data and parsing logic with no OS dependencies: the command
//! configuration record loaded from disk and the image-format detection used
//! by the RAM/flash download actions.

pub mod command_config;
pub mod image;
