mod common;

use std::fs;

use common::MockCpu;
use pacemu_core::Error;
use pacemu_core::error::DataError;
use pacemu_core::machine::Machine;
use pacemu_core::region::RegionId;
use pacemu_core::rom::{
    DIAGNOSTIC_PROGRAM, DirectorySource, MemorySource, RomSet, SLOTS, diagnostic_rom,
    find_rom_sets,
};
use pacemu_core::scheduler::State;
use tempfile::tempdir;

/// Every chip filled with its slot index so the concatenation order shows.
fn full_set() -> MemorySource {
    let mut source = MemorySource::new();
    for (i, slot) in SLOTS.iter().enumerate() {
        source.insert(slot.name, vec![i as u8 + 1; slot.size]);
    }
    source
}

#[test]
fn program_rom_concatenates_in_slot_order() {
    let set = RomSet::load(&mut full_set()).unwrap();
    let rom = set.program_rom();
    assert_eq!(rom.len(), 0x4000);
    assert_eq!(rom[0x0000], 1);
    assert_eq!(rom[0x1000], 2);
    assert_eq!(rom[0x2FFF], 3);
    assert_eq!(rom[0x3FFF], 4);
    assert_eq!(set.character_rom().len(), 0x1000);
    assert_eq!(set.color_proms().len(), 32 + 256);
    assert_eq!(set.total_bytes(), 0x4000 + 0x1000 + 32 + 256);
}

#[test]
fn size_mismatch_is_reported_and_nothing_loads() {
    let mut source = full_set();
    source.insert("pacman.6h", vec![0; 0x0FFF]);
    let err = RomSet::load(&mut source).unwrap_err();
    match err {
        Error::Data(DataError::SizeMismatch {
            name,
            expected,
            actual,
        }) => {
            assert_eq!(name, "pacman.6h");
            assert_eq!(expected, 0x1000);
            assert_eq!(actual, 0x0FFF);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_prom_is_reported() {
    let mut source = MemorySource::new();
    for slot in SLOTS.iter().filter(|s| s.name != "82s126.4a") {
        source.insert(slot.name, vec![0; slot.size]);
    }
    assert!(matches!(
        RomSet::load(&mut source),
        Err(Error::Data(DataError::Missing { ref name, .. })) if name == "82s126.4a"
    ));
}

#[test]
fn directory_source_reads_chip_files() {
    let dir = tempdir().unwrap();
    for slot in SLOTS.iter() {
        fs::write(dir.path().join(slot.name), vec![0xA5; slot.size]).unwrap();
    }
    let set = RomSet::load(&mut DirectorySource::new(dir.path())).unwrap();
    assert!(set.program_rom().iter().all(|&b| b == 0xA5));
}

#[test]
fn directory_source_missing_file_surfaces_io_error() {
    let dir = tempdir().unwrap();
    let err = RomSet::load(&mut DirectorySource::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        Error::Data(DataError::Missing { ref source, .. })
            if source.kind() == std::io::ErrorKind::NotFound
    ));
}

#[test]
fn scanner_finds_pacman_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("PacMan")).unwrap();
    fs::create_dir(dir.path().join("pacman-midway")).unwrap();
    fs::create_dir(dir.path().join("galaga")).unwrap();
    fs::write(dir.path().join("pacman.zip"), b"not a dir").unwrap();

    let found = find_rom_sets(dir.path()).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["PacMan", "pacman-midway"]);
}

#[test]
fn rom_set_start_decodes_graphics() {
    let mut source = full_set();
    let mut palette = vec![0u8; 32];
    palette[1] = 0xFF;
    source.insert("82s123.7f", palette);
    let set = RomSet::load(&mut source).unwrap();

    let mut machine = Machine::new(MockCpu::new());
    machine.start_with_rom_set(&set).unwrap();

    assert_eq!(machine.state(), State::Running);
    assert_eq!(machine.read_byte(0x0000), 1);
    assert!(machine.compositor().has_lookup());
    assert_eq!(machine.compositor().palette().get(1).packed(), 0xFFFF_FFFF);
    let driver = machine.driver();
    assert_eq!(driver.region(RegionId::Graphics).map(<[u8]>::len), Some(0x1000));
    assert_eq!(driver.region(RegionId::ColorProm).map(<[u8]>::len), Some(288));

    machine.stop().unwrap();
    assert_eq!(machine.driver().stats().regions, 0);
}

#[test]
fn diagnostic_program_enables_interrupts_before_halting() {
    let rom = diagnostic_rom();
    let tail = &DIAGNOSTIC_PROGRAM[DIAGNOSTIC_PROGRAM.len() - 8..];
    // LD A,1 ; LD ($5000),A ; HALT ; JR -3
    assert_eq!(tail, &[0x3E, 0x01, 0x32, 0x00, 0x50, 0x76, 0x18, 0xFD]);
    assert_eq!(rom.len(), 0x4000);
}
