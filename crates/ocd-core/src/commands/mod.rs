//! Construction of the command strings sent down the telnet console.

pub mod builder;

pub use builder::*;
