//! DispatchUseCase: turns frontend actions into debugger command lines.
//!
//! This use case sits at the application layer and delegates transmission to
//! a [`CommandSink`], so the command construction stays testable without a
//! live telnet connection. The binary wires in a sink backed by an `mpsc`
//! channel that the event loop drains into the socket; tests wire in
//! [`RecordingSink`].

use std::path::Path;

use ocd_core::commands;
use ocd_core::{CommandConfig, ImageFormatError};
use thiserror::Error;

/// Error type for command dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The image path did not name an `.elf`/`.bin` file.
    #[error(transparent)]
    Image(#[from] ImageFormatError),
    /// The sink rejected the command line.
    #[error("command channel closed: {0}")]
    SinkClosed(String),
}

/// Receives command lines destined for the telnet console, in send order.
pub trait CommandSink {
    /// Accepts one command line (without line terminator).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SinkClosed`] when the transport side is gone.
    fn submit(&mut self, line: &str) -> Result<(), DispatchError>;
}

/// The command dispatch use case.
///
/// Holds the active [`CommandConfig`] and writes one or more command lines
/// into the sink per action.
pub struct DispatchUseCase<S: CommandSink> {
    sink: S,
    config: CommandConfig,
}

impl<S: CommandSink> DispatchUseCase<S> {
    /// Creates a new use case with the given sink and command configuration.
    pub fn new(sink: S, config: CommandConfig) -> Self {
        Self { sink, config }
    }

    /// Replaces the command configuration (after `:loadcfg`).
    pub fn set_config(&mut self, config: CommandConfig) {
        self.config = config;
    }

    /// The active command configuration.
    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// The sink the use case writes into.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn submit_all(&mut self, lines: Vec<String>) -> Result<(), DispatchError> {
        for line in lines {
            self.sink.submit(&line)?;
        }
        Ok(())
    }

    /// Passes a typed line through unchanged.
    pub fn raw(&mut self, line: &str) -> Result<(), DispatchError> {
        self.sink.submit(line)
    }

    /// Sends the soft reset template.
    pub fn soft_reset(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.soft_reset.clone();
        self.sink.submit(&cmd)
    }

    /// Sends the reset template.
    pub fn reset(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.reset.clone();
        self.sink.submit(&cmd)
    }

    /// Sends the halt template.
    pub fn halt(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.halt.clone();
        self.sink.submit(&cmd)
    }

    /// Sends the resume template.
    pub fn resume(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.resume.clone();
        self.sink.submit(&cmd)
    }

    /// Sends the poll template.
    pub fn poll(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.poll.clone();
        self.sink.submit(&cmd)
    }

    /// Sends the flash probe template.
    pub fn flash_probe(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.flash_probe.clone();
        self.sink.submit(&cmd)
    }

    /// Sends the flash info template.
    pub fn flash_info(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.flash_info.clone();
        self.sink.submit(&cmd)
    }

    /// Sends the flash unlock template.
    pub fn flash_unlock(&mut self) -> Result<(), DispatchError> {
        let cmd = self.config.flash_unlock.clone();
        self.sink.submit(&cmd)
    }

    /// Soft-resets, then sends the flash erase template.
    pub fn erase_flash(&mut self) -> Result<(), DispatchError> {
        let lines = commands::erase_flash(&self.config);
        self.submit_all(lines)
    }

    /// Displays the first words of the base, flash, and RAM regions.
    pub fn show_memory(&mut self) -> Result<(), DispatchError> {
        let lines = commands::show_memory(&self.config);
        self.submit_all(lines)
    }

    /// Writes the remap register.
    pub fn remap(&mut self) -> Result<(), DispatchError> {
        let cmd = commands::remap(&self.config);
        self.sink.submit(&cmd)
    }

    /// Writes the CPU reset register.
    pub fn cpu_reset(&mut self) -> Result<(), DispatchError> {
        let cmd = commands::cpu_reset(&self.config);
        self.sink.submit(&cmd)
    }

    /// Writes the peripheral reset register.
    pub fn periph_reset(&mut self) -> Result<(), DispatchError> {
        let cmd = commands::periph_reset(&self.config);
        self.sink.submit(&cmd)
    }

    /// Downloads an image into RAM.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Image`] when the filename is not `.elf`/`.bin`;
    /// nothing is sent in that case.
    pub fn ram_load(&mut self, path: &Path) -> Result<(), DispatchError> {
        let lines = commands::ram_load(&self.config, path)?;
        self.submit_all(lines)
    }

    /// Downloads an image into flash, optionally erasing first.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Image`] when the filename is not `.elf`/`.bin`;
    /// nothing is sent in that case.
    pub fn flash_load(&mut self, path: &Path, erase: bool) -> Result<(), DispatchError> {
        let lines = commands::flash_load(&self.config, path, erase)?;
        self.submit_all(lines)
    }
}

// ── Test double ───────────────────────────────────────────────────────────────

/// A sink that records every submitted line, for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Lines in submission order.
    pub lines: Vec<String>,
}

impl CommandSink for RecordingSink {
    fn submit(&mut self, line: &str) -> Result<(), DispatchError> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
