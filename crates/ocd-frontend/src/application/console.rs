//! The console input grammar.
//!
//! One line of user input becomes one [`Action`]. Lines starting with `:` are
//! frontend actions; everything else is raw passthrough to the telnet
//! console. Unknown `:` actions are reported rather than forwarded, so a typo
//! never reaches the debugger.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for console line parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The `:` action name is not part of the grammar.
    #[error("unknown action `:{0}` (try :help)")]
    UnknownAction(String),
    /// The action requires an argument that was not supplied.
    #[error(":{0} needs {1}")]
    MissingArgument(&'static str, &'static str),
    /// The action takes a fixed argument set and got something else.
    #[error("invalid argument for :{0}: {1}")]
    InvalidArgument(&'static str, String),
}

/// Everything one console line can ask the frontend to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open the telnet connection, optionally to `host:port`.
    Connect { address: Option<String> },
    /// Close the telnet connection.
    Disconnect,
    /// Close and immediately re-open the telnet connection.
    ResetConnection,

    /// Remember the RAM image selection.
    RamFile(PathBuf),
    /// Remember the flash image selection.
    FlashFile(PathBuf),
    /// Toggle erase-before-write for flash downloads.
    Erase(bool),
    /// Download an image into RAM (argument overrides the selection).
    RamLoad(Option<PathBuf>),
    /// Download an image into flash.
    FlashLoad {
        path: Option<PathBuf>,
        /// One-shot override of the session erase flag.
        erase: Option<bool>,
    },

    /// Send the soft reset template.
    SoftReset,
    /// Send the reset template.
    Reset,
    /// Send the halt template.
    Halt,
    /// Send the resume template.
    Resume,
    /// Send the poll template.
    Poll,
    /// Soft-reset, then send the flash erase template.
    EraseFlash,
    /// Send the flash probe template.
    FlashProbe,
    /// Send the flash info template.
    FlashInfo,
    /// Send the flash unlock template.
    FlashUnlock,
    /// Display the first words of base, flash, and RAM.
    ShowMemory,
    /// Write the remap register.
    Remap,
    /// Write the CPU reset register.
    CpuReset,
    /// Write the peripheral reset register.
    PeriphReset,

    /// Load the command configuration file (argument overrides the selection).
    LoadConfig(Option<PathBuf>),
    /// Save the command configuration file.
    SaveConfig(Option<PathBuf>),
    /// Select, or with no argument print, the OpenOCD server config file.
    ServerConfig(Option<PathBuf>),
    /// Start the OpenOCD server process.
    ServerStart,
    /// Stop the OpenOCD server process.
    ServerStop,

    /// Print the action summary.
    Help,
    /// Leave the frontend.
    Quit,
    /// Pass the line to the telnet console verbatim.
    Raw(String),
}

/// Parses one console input line.
///
/// # Errors
///
/// Returns a [`ParseError`] for unknown `:` actions and malformed arguments;
/// the caller prints it as one line. Non-`:` lines never fail.
pub fn parse_line(line: &str) -> Result<Action, ParseError> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Ok(Action::Raw(trimmed.to_string()));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or("");
    let args: Vec<&str> = words.collect();

    match name {
        "connect" => Ok(Action::Connect {
            address: args.first().map(|s| s.to_string()),
        }),
        "disconnect" => Ok(Action::Disconnect),
        "resetconn" => Ok(Action::ResetConnection),

        "ramfile" => Ok(Action::RamFile(path_arg("ramfile", &args)?)),
        "flashfile" => Ok(Action::FlashFile(path_arg("flashfile", &args)?)),
        "erase" => match args.first().copied() {
            Some("on") => Ok(Action::Erase(true)),
            Some("off") => Ok(Action::Erase(false)),
            Some(other) => Err(ParseError::InvalidArgument("erase", other.to_string())),
            None => Err(ParseError::MissingArgument("erase", "`on` or `off`")),
        },
        "ramload" => Ok(Action::RamLoad(args.first().map(PathBuf::from))),
        "flashload" => {
            let mut erase = None;
            let mut path = None;
            for arg in &args {
                match *arg {
                    "--erase" => erase = Some(true),
                    "--no-erase" => erase = Some(false),
                    other => path = Some(PathBuf::from(other)),
                }
            }
            Ok(Action::FlashLoad { path, erase })
        }

        "softreset" => Ok(Action::SoftReset),
        "reset" => Ok(Action::Reset),
        "halt" => Ok(Action::Halt),
        "resume" => Ok(Action::Resume),
        "poll" => Ok(Action::Poll),
        "eraseflash" => Ok(Action::EraseFlash),
        "probe" => Ok(Action::FlashProbe),
        "flashinfo" => Ok(Action::FlashInfo),
        "unlock" => Ok(Action::FlashUnlock),
        "mem" => Ok(Action::ShowMemory),
        "remap" => Ok(Action::Remap),
        "cpureset" => Ok(Action::CpuReset),
        "periphreset" => Ok(Action::PeriphReset),

        "loadcfg" => Ok(Action::LoadConfig(args.first().map(PathBuf::from))),
        "savecfg" => Ok(Action::SaveConfig(args.first().map(PathBuf::from))),
        "servercfg" => Ok(Action::ServerConfig(args.first().map(PathBuf::from))),
        "server" => match args.first().copied() {
            Some("start") => Ok(Action::ServerStart),
            Some("stop") => Ok(Action::ServerStop),
            Some(other) => Err(ParseError::InvalidArgument("server", other.to_string())),
            None => Err(ParseError::MissingArgument("server", "`start` or `stop`")),
        },

        "help" => Ok(Action::Help),
        "quit" | "exit" => Ok(Action::Quit),
        other => Err(ParseError::UnknownAction(other.to_string())),
    }
}

fn path_arg(action: &'static str, args: &[&str]) -> Result<PathBuf, ParseError> {
    args.first()
        .map(PathBuf::from)
        .ok_or(ParseError::MissingArgument(action, "a file path"))
}

/// The `:help` text.
pub const HELP: &str = "\
frontend actions (everything else goes to the telnet console verbatim):
  :connect [host:port]    open the telnet connection
  :disconnect             close the telnet connection
  :resetconn              close and re-open the connection
  :server start|stop      supervise the openocd process
  :servercfg [path]       select (or print) the openocd -f config file
  :ramfile <path>         select the RAM image
  :flashfile <path>       select the flash image
  :erase on|off           erase flash before writing
  :ramload [path]         download image into RAM
  :flashload [--erase] [path]  download image into flash
  :softreset :reset :halt :resume :poll
  :eraseflash :probe :flashinfo :unlock
  :mem                    display base/flash/RAM words
  :remap :cpureset :periphreset
  :loadcfg [path]         load the command configuration
  :savecfg [path]         save the command configuration
  :quit";

// ── Tests ─────────────────────────────────────────────────────────────────────
