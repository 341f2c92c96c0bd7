//! Builders for every command the frontend can send.
//!
//! The functions here are pure: they take the [`CommandConfig`] record plus
//! the user's input and return the exact line(s) of text destined for the
//! OpenOCD console. Multi-command actions (image downloads, flash erase)
//! return the lines in send order; the caller transmits them one by one.
//!
//! All memory inspection uses `mdw` (memory display word) and all register
//! pokes use `mww` (memory write word), the same console primitives a human
//! operator would type.

use std::path::Path;

use crate::domain::command_config::CommandConfig;
use crate::domain::image::{ImageFormat, ImageFormatError};

/// Number of words shown per region by the memory display action.
const MEMORY_DISPLAY_WORDS: &str = "0x08";

/// Commands inspecting the first words of the base, flash, and RAM regions.
pub fn show_memory(config: &CommandConfig) -> Vec<String> {
    vec![
        format!("mdw {} {MEMORY_DISPLAY_WORDS}", config.base_address),
        format!("mdw {} {MEMORY_DISPLAY_WORDS}", config.flash_address),
        format!("mdw {} {MEMORY_DISPLAY_WORDS}", config.ram_address),
    ]
}

/// Register write toggling the flash/RAM remap window.
pub fn remap(config: &CommandConfig) -> String {
    format!("mww {} {}", config.remap.address, config.remap.value)
}

/// Register write resetting the CPU core.
pub fn cpu_reset(config: &CommandConfig) -> String {
    format!("mww {} {}", config.cpu_reset.address, config.cpu_reset.value)
}

/// Register write resetting the peripheral set.
pub fn periph_reset(config: &CommandConfig) -> String {
    format!(
        "mww {} {}",
        config.periph_reset.address, config.periph_reset.value
    )
}

/// Soft-reset followed by the configured flash erase template.
pub fn erase_flash(config: &CommandConfig) -> Vec<String> {
    vec![config.soft_reset.clone(), config.flash_erase.clone()]
}

/// Downloads an image into RAM.
///
/// The target is soft-reset and halted first, then the configured RAM load
/// template is applied: `<RAMWRITE> <path> <offset> <format>`. ELF images
/// load at `0x0`, raw binaries at the start of SRAM.
///
/// # Errors
///
/// Returns [`ImageFormatError`] when the filename is not an `.elf`/`.bin`.
pub fn ram_load(config: &CommandConfig, path: &Path) -> Result<Vec<String>, ImageFormatError> {
    let format = ImageFormat::from_path(path)?;
    Ok(vec![
        config.soft_reset.clone(),
        format!(
            "{} {} {} {}",
            config.ram_write,
            path.display(),
            format.ram_offset(),
            format.keyword()
        ),
    ])
}

/// Downloads an image into flash.
///
/// The target is soft-reset and halted first, then the configured flash write
/// template is applied. With `erase` set, the configured erase suffix is
/// inserted between the template and the path, matching
/// `flash write_image erase <file> ...`.
///
/// # Errors
///
/// Returns [`ImageFormatError`] when the filename is not an `.elf`/`.bin`.
pub fn flash_load(
    config: &CommandConfig,
    path: &Path,
    erase: bool,
) -> Result<Vec<String>, ImageFormatError> {
    let format = ImageFormat::from_path(path)?;
    let write = if erase {
        format!("{} {}", config.flash_write, config.erase_suffix)
    } else {
        config.flash_write.clone()
    };
    Ok(vec![
        config.soft_reset.clone(),
        format!(
            "{} {} {} {}",
            write,
            path.display(),
            format.flash_offset(),
            format.keyword()
        ),
    ])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CommandConfig {
        CommandConfig::default()
    }

    #[test]
    fn test_show_memory_inspects_base_flash_and_ram() {
        let cmds = show_memory(&config());
        assert_eq!(
            cmds,
            vec![
                "mdw 0x000000 0x08".to_string(),
                "mdw 0x100000 0x08".to_string(),
                "mdw 0x200000 0x08".to_string(),
            ]
        );
    }

    #[test]
    fn test_remap_writes_configured_register() {
        assert_eq!(remap(&config()), "mww 0xFFFFFF00 0x00000001");
    }

    #[test]
    fn test_cpu_and_periph_reset_write_reset_controller() {
        assert_eq!(cpu_reset(&config()), "mww 0xFFFFFD00 0xA5000001");
        assert_eq!(periph_reset(&config()), "mww 0xFFFFFD00 0xA5000004");
    }

    #[test]
    fn test_erase_flash_soft_resets_first() {
        let cmds = erase_flash(&config());
        assert_eq!(cmds[0], "soft_reset_halt");
        assert_eq!(cmds[1], "flash erase_address 0x100000 0x40000");
    }

    #[test]
    fn test_ram_load_elf_uses_offset_zero() {
        let cmds = ram_load(&config(), Path::new("/tmp/app.elf")).expect("elf");
        assert_eq!(
            cmds,
            vec![
                "soft_reset_halt".to_string(),
                "load_image /tmp/app.elf 0x0 elf".to_string(),
            ]
        );
    }

    #[test]
    fn test_ram_load_bin_targets_sram_base() {
        let cmds = ram_load(&config(), Path::new("/tmp/app.BIN")).expect("bin");
        assert_eq!(cmds[1], "load_image /tmp/app.BIN 0x200000 bin");
    }

    #[test]
    fn test_flash_load_elf_without_erase() {
        let cmds = flash_load(&config(), Path::new("fw.elf"), false).expect("elf");
        assert_eq!(
            cmds,
            vec![
                "soft_reset_halt".to_string(),
                "flash write_image fw.elf 0x0 elf".to_string(),
            ]
        );
    }

    #[test]
    fn test_flash_load_bin_with_erase_inserts_suffix() {
        let cmds = flash_load(&config(), Path::new("fw.bin"), true).expect("bin");
        assert_eq!(cmds[1], "flash write_image erase fw.bin 0x100000 bin");
    }

    #[test]
    fn test_flash_load_rejects_unknown_extension() {
        assert!(flash_load(&config(), Path::new("fw.hex"), false).is_err());
    }

    #[test]
    fn test_custom_templates_flow_through() {
        // Arrange
        let mut cfg = config();
        cfg.soft_reset = "soft_reset".to_string();
        cfg.ram_write = "fast_load".to_string();

        // Act
        let cmds = ram_load(&cfg, Path::new("x.elf")).expect("elf");

        // Assert
        assert_eq!(cmds[0], "soft_reset");
        assert_eq!(cmds[1], "fast_load x.elf 0x0 elf");
    }
}
