//! Integration tests for the command dispatch pipeline.
//!
//! These tests exercise the application layer of ocd-frontend end-to-end:
//! console grammar + `DispatchUseCase` + a command config loaded from a real
//! file, with the socket replaced by a recording sink.

use std::path::{Path, PathBuf};

use ocd_core::CommandConfig;
use ocd_frontend::application::console::{parse_line, Action};
use ocd_frontend::application::dispatch::{DispatchUseCase, RecordingSink};

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ocd_frontend_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write scratch file");
    path
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_console_action_drives_dispatch_to_exact_command() {
    let action = parse_line(":halt").expect("parse");
    assert_eq!(action, Action::Halt);

    let mut uc = DispatchUseCase::new(RecordingSink::default(), CommandConfig::default());
    uc.halt().expect("dispatch");

    assert_eq!(uc_lines(&uc), vec!["halt"]);
}

#[test]
fn test_config_file_templates_reach_the_wire() {
    // A config overriding the halt and soft-reset templates.
    let path = scratch_file(
        "custom.cfg",
        "HALT = my_halt\nSOFTRESET = my_soft_reset\nRAMWRITE = my_load\n",
    );
    let config = CommandConfig::load(&path).expect("load");

    let mut uc = DispatchUseCase::new(RecordingSink::default(), config);
    uc.ram_load(Path::new("blink.elf")).expect("dispatch");

    assert_eq!(
        uc_lines(&uc),
        vec!["my_soft_reset", "my_load blink.elf 0x0 elf"]
    );
}

#[test]
fn test_flash_download_honours_extension_and_erase() {
    let mut uc = DispatchUseCase::new(RecordingSink::default(), CommandConfig::default());

    uc.flash_load(Path::new("one.elf"), false).expect("elf");
    uc.flash_load(Path::new("two.BIN"), true).expect("bin");

    assert_eq!(
        uc_lines(&uc),
        vec![
            "soft_reset_halt",
            "flash write_image one.elf 0x0 elf",
            "soft_reset_halt",
            "flash write_image erase two.BIN 0x100000 bin",
        ]
    );
}

#[test]
fn test_full_command_button_row() {
    // The whole fixed command set, in one session, against the defaults.
    let mut uc = DispatchUseCase::new(RecordingSink::default(), CommandConfig::default());

    uc.soft_reset().unwrap();
    uc.reset().unwrap();
    uc.halt().unwrap();
    uc.resume().unwrap();
    uc.poll().unwrap();
    uc.erase_flash().unwrap();
    uc.show_memory().unwrap();
    uc.remap().unwrap();
    uc.cpu_reset().unwrap();
    uc.periph_reset().unwrap();

    assert_eq!(
        uc_lines(&uc),
        vec![
            "soft_reset_halt",
            "reset",
            "halt",
            "resume",
            "poll",
            "soft_reset_halt",
            "flash erase_address 0x100000 0x40000",
            "mdw 0x000000 0x08",
            "mdw 0x100000 0x08",
            "mdw 0x200000 0x08",
            "mww 0xFFFFFF00 0x00000001",
            "mww 0xFFFFFD00 0xA5000001",
            "mww 0xFFFFFD00 0xA5000004",
        ]
    );
}

#[test]
fn test_round_trip_config_preserves_dispatch_output() {
    // Dispatch output must be identical before and after a save/load cycle.
    let mut config = CommandConfig::default();
    config.halt = "stop".to_string();

    let path = scratch_file("roundtrip.cfg", "");
    config.save(&path).expect("save");
    let reloaded = CommandConfig::load(&path).expect("load");

    let mut before = DispatchUseCase::new(RecordingSink::default(), config);
    let mut after = DispatchUseCase::new(RecordingSink::default(), reloaded);
    before.halt().unwrap();
    after.halt().unwrap();

    assert_eq!(uc_lines(&before), uc_lines(&after));
}

/// Snapshot of the lines a use case has submitted.
fn uc_lines(uc: &DispatchUseCase<RecordingSink>) -> Vec<String> {
    uc.sink().lines.clone()
}
