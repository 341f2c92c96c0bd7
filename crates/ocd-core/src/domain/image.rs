//! Image-format detection for RAM and flash downloads.
//!
//! OpenOCD's `load_image`/`flash write_image` commands take the file format
//! as a trailing keyword and, for raw binaries, need to be told where the
//! image goes. ELF images carry their own load addresses, so they are always
//! pushed at offset `0x0`; raw `.bin` images are placed at the start of SRAM
//! (`0x200000`) or flash (`0x100000`) on a SAM7.
//!
//! Detection is by filename extension, case-insensitive, and anything else is
//! reported instead of guessed at.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for image-format detection.
#[derive(Debug, Error)]
pub enum ImageFormatError {
    /// The filename has no extension, or one other than `elf`/`bin`.
    #[error("cannot tell image format of {}: expected an .elf or .bin file", path.display())]
    Unrecognized { path: PathBuf },
}

/// Supported download image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// ELF executable; load addresses come from the program headers.
    Elf,
    /// Raw binary; loaded at a fixed memory-map offset.
    Bin,
}

impl ImageFormat {
    /// Detects the format from the file extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ImageFormatError::Unrecognized`] for extensionless names and
    /// unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self, ImageFormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ImageFormatError::Unrecognized {
                path: path.to_path_buf(),
            })?;

        if ext.eq_ignore_ascii_case("elf") {
            Ok(ImageFormat::Elf)
        } else if ext.eq_ignore_ascii_case("bin") {
            Ok(ImageFormat::Bin)
        } else {
            Err(ImageFormatError::Unrecognized {
                path: path.to_path_buf(),
            })
        }
    }

    /// The format keyword appended to the download command.
    pub fn keyword(self) -> &'static str {
        match self {
            ImageFormat::Elf => "elf",
            ImageFormat::Bin => "bin",
        }
    }

    /// Load offset for a download into RAM.
    pub fn ram_offset(self) -> &'static str {
        match self {
            ImageFormat::Elf => "0x0",
            ImageFormat::Bin => "0x200000",
        }
    }

    /// Load offset for a download into flash.
    pub fn flash_offset(self) -> &'static str {
        match self {
            ImageFormat::Elf => "0x0",
            ImageFormat::Bin => "0x100000",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_elf_is_detected() {
        let fmt = ImageFormat::from_path(Path::new("firmware.elf")).expect("detect");
        assert_eq!(fmt, ImageFormat::Elf);
    }

    #[test]
    fn test_uppercase_extensions_are_detected() {
        assert_eq!(
            ImageFormat::from_path(Path::new("FIRMWARE.ELF")).expect("detect"),
            ImageFormat::Elf
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("IMAGE.BIN")).expect("detect"),
            ImageFormat::Bin
        );
    }

    #[test]
    fn test_elf_loads_at_zero_in_both_targets() {
        assert_eq!(ImageFormat::Elf.ram_offset(), "0x0");
        assert_eq!(ImageFormat::Elf.flash_offset(), "0x0");
    }

    #[test]
    fn test_bin_offsets_differ_per_target() {
        assert_eq!(ImageFormat::Bin.ram_offset(), "0x200000");
        assert_eq!(ImageFormat::Bin.flash_offset(), "0x100000");
    }

    #[test]
    fn test_short_filename_is_an_error_not_a_crash() {
        // Names shorter than an extension used to index out of bounds in the
        // old character-comparison detector.
        let err = ImageFormat::from_path(Path::new("a")).expect_err("no extension");
        assert!(matches!(err, ImageFormatError::Unrecognized { .. }));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        assert!(ImageFormat::from_path(Path::new("notes.hex")).is_err());
    }

    #[test]
    fn test_extension_anywhere_in_name_does_not_count() {
        // Only the final extension matters, not a substring of the stem.
        assert!(ImageFormat::from_path(Path::new("elf_image.hex")).is_err());
    }
}
