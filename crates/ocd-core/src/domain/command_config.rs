//! The command configuration record and its flat-file format.
//!
//! The frontend keeps every debugger command template and target register
//! address in a single [`CommandConfig`] record, persisted as a line-oriented
//! text file:
//!
//! ```text
//! # SAM7 command configuration
//! BASE = 0x000000
//! REMAP = 0xFFFFFF00 0x00000001
//! FLASHWRITE = flash write_image
//! ```
//!
//! One `KEY = value...` line per key, values separated by single spaces.
//! Lines starting with `#` are comments; unknown keys are ignored so the file
//! stays forward-compatible with older frontends.
//!
//! Each key carries a fixed number of fields (a register write needs an
//! address and a value, a flash-erase template is a four-word command, and so
//! on). The parser validates the field count of every recognised line and
//! reports the offending line number instead of silently accepting a
//! truncated file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing command config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A recognised key was not followed by the `=` separator.
    #[error("line {line}: expected `{key} = ...`, found no `=` separator")]
    MissingSeparator { line: usize, key: &'static str },

    /// A recognised key carried the wrong number of value fields.
    #[error("line {line}: key {key} expects {expected} field(s), found {found}")]
    FieldCount {
        line: usize,
        key: &'static str,
        expected: usize,
        found: usize,
    },
}

// ── Key table ─────────────────────────────────────────────────────────────────

/// The fixed set of recognised configuration keys.
///
/// The discriminant order is also the serialization order, which matches the
/// file layout produced by every previous version of the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigKey {
    Base,
    Flash,
    Ram,
    Remap,
    ResetCpu,
    ResetPeriph,
    FlashProbe,
    FlashInfo,
    FlashErase,
    FlashUnlock,
    FlashWrite,
    EraseSuffix,
    RamWrite,
    Reset,
    Halt,
    Resume,
    Poll,
    SoftReset,
}

impl ConfigKey {
    /// All keys in serialization order.
    const ALL: [ConfigKey; 18] = [
        ConfigKey::Base,
        ConfigKey::Flash,
        ConfigKey::Ram,
        ConfigKey::Remap,
        ConfigKey::ResetCpu,
        ConfigKey::ResetPeriph,
        ConfigKey::FlashProbe,
        ConfigKey::FlashInfo,
        ConfigKey::FlashErase,
        ConfigKey::FlashUnlock,
        ConfigKey::FlashWrite,
        ConfigKey::EraseSuffix,
        ConfigKey::RamWrite,
        ConfigKey::Reset,
        ConfigKey::Halt,
        ConfigKey::Resume,
        ConfigKey::Poll,
        ConfigKey::SoftReset,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Base => "BASE",
            ConfigKey::Flash => "FLASH",
            ConfigKey::Ram => "RAM",
            ConfigKey::Remap => "REMAP",
            ConfigKey::ResetCpu => "RESETCPU",
            ConfigKey::ResetPeriph => "RESETPERIPH",
            ConfigKey::FlashProbe => "FLASHPROBE",
            ConfigKey::FlashInfo => "FLASHINFO",
            ConfigKey::FlashErase => "FLASHERASE",
            ConfigKey::FlashUnlock => "FLASHUNLOCK",
            ConfigKey::FlashWrite => "FLASHWRITE",
            ConfigKey::EraseSuffix => "ERASESUFFIX",
            ConfigKey::RamWrite => "RAMWRITE",
            ConfigKey::Reset => "RESET",
            ConfigKey::Halt => "HALT",
            ConfigKey::Resume => "RESUME",
            ConfigKey::Poll => "POLL",
            ConfigKey::SoftReset => "SOFTRESET",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == token)
    }

    /// Number of whitespace-separated value fields the key carries.
    fn expected_fields(self) -> usize {
        match self {
            ConfigKey::Base
            | ConfigKey::Flash
            | ConfigKey::Ram
            | ConfigKey::EraseSuffix
            | ConfigKey::RamWrite
            | ConfigKey::Reset
            | ConfigKey::Halt
            | ConfigKey::Resume
            | ConfigKey::Poll
            | ConfigKey::SoftReset => 1,
            ConfigKey::Remap
            | ConfigKey::ResetCpu
            | ConfigKey::ResetPeriph
            | ConfigKey::FlashWrite => 2,
            ConfigKey::FlashProbe | ConfigKey::FlashInfo => 3,
            ConfigKey::FlashErase => 4,
            ConfigKey::FlashUnlock => 5,
        }
    }
}

// ── Record types ──────────────────────────────────────────────────────────────

/// Address/value pair for a `mww`-style register write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Register address, kept as entered (e.g. `0xFFFFFF00`).
    pub address: String,
    /// Value written to the register.
    pub value: String,
}

impl RegisterWrite {
    fn new(address: &str, value: &str) -> Self {
        Self {
            address: address.to_string(),
            value: value.to_string(),
        }
    }
}

/// Every command template and target address the frontend can send.
///
/// All fields are plain strings: they are command fragments pasted verbatim
/// into the telnet console, so the record imposes token counts but no further
/// typing. Multi-word templates (e.g. `flash write_image`) are stored joined
/// with single spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConfig {
    /// Base (remap window) address inspected by the memory display action.
    pub base_address: String,
    /// Flash base address.
    pub flash_address: String,
    /// RAM base address.
    pub ram_address: String,
    /// Remap register write.
    pub remap: RegisterWrite,
    /// CPU reset register write.
    pub cpu_reset: RegisterWrite,
    /// Peripheral reset register write.
    pub periph_reset: RegisterWrite,
    /// Flash probe command (three words).
    pub flash_probe: String,
    /// Flash info command (three words).
    pub flash_info: String,
    /// Flash erase command (four words).
    pub flash_erase: String,
    /// Flash unlock command (five words).
    pub flash_unlock: String,
    /// Flash write command stem (two words); the image path, offset and
    /// format keyword are appended per download.
    pub flash_write: String,
    /// Keyword inserted after the flash write stem when erase-before-write
    /// is requested.
    pub erase_suffix: String,
    /// RAM load command stem.
    pub ram_write: String,
    /// Reset command.
    pub reset: String,
    /// Halt command.
    pub halt: String,
    /// Resume command.
    pub resume: String,
    /// Poll command.
    pub poll: String,
    /// Soft reset command, sent before every image download.
    pub soft_reset: String,
}

impl Default for CommandConfig {
    /// Stock values for an AT91SAM7 target: flash is mapped at `0x100000`,
    /// SRAM at `0x200000`, the memory controller remap register at
    /// `0xFFFFFF00` and the reset controller at `0xFFFFFD00`.
    fn default() -> Self {
        Self {
            base_address: "0x000000".to_string(),
            flash_address: "0x100000".to_string(),
            ram_address: "0x200000".to_string(),
            remap: RegisterWrite::new("0xFFFFFF00", "0x00000001"),
            cpu_reset: RegisterWrite::new("0xFFFFFD00", "0xA5000001"),
            periph_reset: RegisterWrite::new("0xFFFFFD00", "0xA5000004"),
            flash_probe: "flash probe 0".to_string(),
            flash_info: "flash info 0".to_string(),
            flash_erase: "flash erase_address 0x100000 0x40000".to_string(),
            flash_unlock: "flash protect 0 0 off".to_string(),
            flash_write: "flash write_image".to_string(),
            erase_suffix: "erase".to_string(),
            ram_write: "load_image".to_string(),
            reset: "reset".to_string(),
            halt: "halt".to_string(),
            resume: "resume".to_string(),
            poll: "poll".to_string(),
            soft_reset: "soft_reset_halt".to_string(),
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

impl CommandConfig {
    /// Parses a command configuration from its text form.
    ///
    /// Starts from [`CommandConfig::default`] and overwrites each field named
    /// by a recognised line, so a partial file leaves the remaining fields at
    /// their stock values. Comment (`#`) and blank lines are skipped and
    /// unrecognised keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSeparator`] or [`ConfigError::FieldCount`]
    /// with the 1-based line number of the first malformed recognised line.
    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            // A non-empty trimmed line always yields a first token.
            let Some(token) = tokens.next() else {
                continue;
            };
            let Some(key) = ConfigKey::from_token(token) else {
                debug!("line {line}: ignoring unknown key {token}");
                continue;
            };

            if tokens.next() != Some("=") {
                return Err(ConfigError::MissingSeparator {
                    line,
                    key: key.as_str(),
                });
            }

            let fields: Vec<&str> = tokens.collect();
            let expected = key.expected_fields();
            if fields.len() != expected {
                return Err(ConfigError::FieldCount {
                    line,
                    key: key.as_str(),
                    expected,
                    found: fields.len(),
                });
            }

            config.apply(key, &fields);
        }

        Ok(config)
    }

    /// Stores the validated fields of one line into the record.
    ///
    /// `fields.len()` has already been checked against the key's expected
    /// count, so indexing here cannot go out of bounds.
    fn apply(&mut self, key: ConfigKey, fields: &[&str]) {
        match key {
            ConfigKey::Base => self.base_address = fields[0].to_string(),
            ConfigKey::Flash => self.flash_address = fields[0].to_string(),
            ConfigKey::Ram => self.ram_address = fields[0].to_string(),
            ConfigKey::Remap => self.remap = RegisterWrite::new(fields[0], fields[1]),
            ConfigKey::ResetCpu => self.cpu_reset = RegisterWrite::new(fields[0], fields[1]),
            ConfigKey::ResetPeriph => self.periph_reset = RegisterWrite::new(fields[0], fields[1]),
            ConfigKey::FlashProbe => self.flash_probe = fields.join(" "),
            ConfigKey::FlashInfo => self.flash_info = fields.join(" "),
            ConfigKey::FlashErase => self.flash_erase = fields.join(" "),
            ConfigKey::FlashUnlock => self.flash_unlock = fields.join(" "),
            ConfigKey::FlashWrite => self.flash_write = fields.join(" "),
            ConfigKey::EraseSuffix => self.erase_suffix = fields[0].to_string(),
            ConfigKey::RamWrite => self.ram_write = fields[0].to_string(),
            ConfigKey::Reset => self.reset = fields[0].to_string(),
            ConfigKey::Halt => self.halt = fields[0].to_string(),
            ConfigKey::Resume => self.resume = fields[0].to_string(),
            ConfigKey::Poll => self.poll = fields[0].to_string(),
            ConfigKey::SoftReset => self.soft_reset = fields[0].to_string(),
        }
    }

    /// Returns the value fields for `key`, joined with single spaces.
    fn field_value(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::Base => self.base_address.clone(),
            ConfigKey::Flash => self.flash_address.clone(),
            ConfigKey::Ram => self.ram_address.clone(),
            ConfigKey::Remap => format!("{} {}", self.remap.address, self.remap.value),
            ConfigKey::ResetCpu => format!("{} {}", self.cpu_reset.address, self.cpu_reset.value),
            ConfigKey::ResetPeriph => {
                format!("{} {}", self.periph_reset.address, self.periph_reset.value)
            }
            ConfigKey::FlashProbe => self.flash_probe.clone(),
            ConfigKey::FlashInfo => self.flash_info.clone(),
            ConfigKey::FlashErase => self.flash_erase.clone(),
            ConfigKey::FlashUnlock => self.flash_unlock.clone(),
            ConfigKey::FlashWrite => self.flash_write.clone(),
            ConfigKey::EraseSuffix => self.erase_suffix.clone(),
            ConfigKey::RamWrite => self.ram_write.clone(),
            ConfigKey::Reset => self.reset.clone(),
            ConfigKey::Halt => self.halt.clone(),
            ConfigKey::Resume => self.resume.clone(),
            ConfigKey::Poll => self.poll.clone(),
            ConfigKey::SoftReset => self.soft_reset.clone(),
        }
    }

    /// Renders the record in its on-disk form: one `KEY = value...` line per
    /// key in the fixed historical order.
    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        for key in ConfigKey::ALL {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{} = {}", key.as_str(), self.field_value(key));
        }
        out
    }

    /// Loads a command configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read (including
    /// when it does not exist) and the parse errors of
    /// [`CommandConfig::from_str`] for malformed content.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&text)
    }

    /// Persists the record to `path`, overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on file-system failure.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_file_string()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_sam7_memory_map() {
        let cfg = CommandConfig::default();
        assert_eq!(cfg.base_address, "0x000000");
        assert_eq!(cfg.flash_address, "0x100000");
        assert_eq!(cfg.ram_address, "0x200000");
    }

    #[test]
    fn test_default_reset_controller_writes() {
        let cfg = CommandConfig::default();
        assert_eq!(cfg.cpu_reset.address, "0xFFFFFD00");
        assert_eq!(cfg.cpu_reset.value, "0xA5000001");
        assert_eq!(cfg.periph_reset.address, "0xFFFFFD00");
        assert_eq!(cfg.periph_reset.value, "0xA5000004");
    }

    #[test]
    fn test_single_field_key_populates_exactly_its_field() {
        // Arrange
        let text = "BASE = 0x123456\n";

        // Act
        let cfg = CommandConfig::from_str(text).expect("parse");

        // Assert: only BASE differs from the defaults
        let mut expected = CommandConfig::default();
        expected.base_address = "0x123456".to_string();
        assert_eq!(cfg, expected);
    }

    #[test]
    fn test_two_field_key_populates_address_and_value() {
        let text = "REMAP = 0xAABBCCDD 0x1\n";
        let cfg = CommandConfig::from_str(text).expect("parse");
        assert_eq!(cfg.remap.address, "0xAABBCCDD");
        assert_eq!(cfg.remap.value, "0x1");
    }

    #[test]
    fn test_multi_word_template_is_rejoined_with_single_spaces() {
        let text = "FLASHERASE = flash erase_address 0x100000 0x10000\n";
        let cfg = CommandConfig::from_str(text).expect("parse");
        assert_eq!(cfg.flash_erase, "flash erase_address 0x100000 0x10000");
    }

    #[test]
    fn test_five_field_unlock_template_parses() {
        let text = "FLASHUNLOCK = flash protect 0 15 off\n";
        let cfg = CommandConfig::from_str(text).expect("parse");
        assert_eq!(cfg.flash_unlock, "flash protect 0 15 off");
    }

    #[test]
    fn test_comment_lines_alter_nothing() {
        let text = "# BASE = 0xDEAD\n#RAM = 0xBEEF\n";
        let cfg = CommandConfig::from_str(text).expect("parse");
        assert_eq!(cfg, CommandConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let text = "SWDSPEED = 4000\nBASE = 0x42\n";
        let cfg = CommandConfig::from_str(text).expect("parse");
        assert_eq!(cfg.base_address, "0x42");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let text = "\n\nHALT = stop\n\n";
        let cfg = CommandConfig::from_str(text).expect("parse");
        assert_eq!(cfg.halt, "stop");
    }

    #[test]
    fn test_short_line_reports_field_count_with_line_number() {
        // A REMAP line missing its value field used to be an out-of-bounds
        // read; it must now be a diagnosable error.
        let text = "BASE = 0x0\nREMAP = 0xFFFFFF00\n";

        let err = CommandConfig::from_str(text).expect_err("must reject short line");

        match err {
            ConfigError::FieldCount {
                line,
                key,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(key, "REMAP");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_excess_fields_are_rejected() {
        let text = "HALT = halt now\n";
        let err = CommandConfig::from_str(text).expect_err("must reject excess fields");
        assert!(matches!(err, ConfigError::FieldCount { found: 2, .. }));
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        let text = "HALT halt\n";
        let err = CommandConfig::from_str(text).expect_err("must require `=`");
        assert!(matches!(
            err,
            ConfigError::MissingSeparator { line: 1, key: "HALT" }
        ));
    }

    #[test]
    fn test_to_file_string_writes_every_key_once_in_order() {
        let rendered = CommandConfig::default().to_file_string();
        let keys: Vec<&str> = rendered
            .lines()
            .map(|l| l.split(' ').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "BASE",
                "FLASH",
                "RAM",
                "REMAP",
                "RESETCPU",
                "RESETPERIPH",
                "FLASHPROBE",
                "FLASHINFO",
                "FLASHERASE",
                "FLASHUNLOCK",
                "FLASHWRITE",
                "ERASESUFFIX",
                "RAMWRITE",
                "RESET",
                "HALT",
                "RESUME",
                "POLL",
                "SOFTRESET",
            ]
        );
    }

    #[test]
    fn test_string_round_trip_reproduces_record() {
        // Arrange: a record with every field moved off its default
        let cfg = CommandConfig {
            base_address: "0x1".to_string(),
            flash_address: "0x2".to_string(),
            ram_address: "0x3".to_string(),
            remap: RegisterWrite::new("0x10", "0x11"),
            cpu_reset: RegisterWrite::new("0x20", "0x21"),
            periph_reset: RegisterWrite::new("0x30", "0x31"),
            flash_probe: "flash probe 1".to_string(),
            flash_info: "flash info 1".to_string(),
            flash_erase: "flash erase_address 0x2 0x400".to_string(),
            flash_unlock: "flash protect 1 3 off".to_string(),
            flash_write: "flash write_bank".to_string(),
            erase_suffix: "unlock".to_string(),
            ram_write: "fast_load".to_string(),
            reset: "reset_init".to_string(),
            halt: "stop".to_string(),
            resume: "go".to_string(),
            poll: "status".to_string(),
            soft_reset: "soft_reset".to_string(),
        };

        // Act
        let restored = CommandConfig::from_str(&cfg.to_file_string()).expect("parse");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_load_missing_file_returns_io_error() {
        let path = Path::new("/nonexistent/path/commands.cfg");
        let err = CommandConfig::load(path).expect_err("missing file must error");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
