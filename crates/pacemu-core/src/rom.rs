//! The `pacman` ROM set: chip names, sizes and where each image lands.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::driver::ROM_SIZE;
use crate::error::{DataError, Result};

/// What a chip holds on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Program,
    Character,
    Palette,
    Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomSlot {
    pub name: &'static str,
    pub size: usize,
    /// Offset inside the image the chip contributes to.
    pub offset: usize,
    pub kind: SlotKind,
}

pub const CHARACTER_ROM_SIZE: usize = 0x1000;
pub const PALETTE_PROM_SIZE: usize = 0x20;
pub const LOOKUP_PROM_SIZE: usize = 0x100;

pub static SLOTS: [RomSlot; 7] = [
    RomSlot {
        name: "pacman.6e",
        size: 0x1000,
        offset: 0x0000,
        kind: SlotKind::Program,
    },
    RomSlot {
        name: "pacman.6f",
        size: 0x1000,
        offset: 0x1000,
        kind: SlotKind::Program,
    },
    RomSlot {
        name: "pacman.6h",
        size: 0x1000,
        offset: 0x2000,
        kind: SlotKind::Program,
    },
    RomSlot {
        name: "pacman.6j",
        size: 0x1000,
        offset: 0x3000,
        kind: SlotKind::Program,
    },
    RomSlot {
        name: "pacman.5e",
        size: CHARACTER_ROM_SIZE,
        offset: 0x0000,
        kind: SlotKind::Character,
    },
    RomSlot {
        name: "82s123.7f",
        size: PALETTE_PROM_SIZE,
        offset: 0x0000,
        kind: SlotKind::Palette,
    },
    RomSlot {
        name: "82s126.4a",
        size: LOOKUP_PROM_SIZE,
        offset: 0x0000,
        kind: SlotKind::Lookup,
    },
];

/// Where ROM images come from.
pub trait RomSource {
    fn read(&mut self, name: &str) -> io::Result<Vec<u8>>;
}

/// Chip images stored as individual files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RomSource for DirectorySource {
    fn read(&mut self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.root.join(name);
        debug!("reading {}", path.display());
        fs::read(path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn with(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl RomSource for MemorySource {
    fn read(&mut self, name: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{name} not found")))
    }
}

/// A complete, size-checked set of board images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomSet {
    program: Vec<u8>,
    character: Vec<u8>,
    palette: Vec<u8>,
    lookup: Vec<u8>,
}

impl RomSet {
    /// Read and validate every chip. Nothing is returned unless all of them
    /// are present with the exact expected size.
    pub fn load(source: &mut dyn RomSource) -> Result<RomSet> {
        let mut set = RomSet {
            program: vec![0; ROM_SIZE],
            character: Vec::new(),
            palette: Vec::new(),
            lookup: Vec::new(),
        };

        for slot in &SLOTS {
            let bytes = source.read(slot.name).map_err(|source| {
                warn!("missing ROM {}: {source}", slot.name);
                DataError::Missing {
                    name: slot.name.to_string(),
                    source,
                }
            })?;
            if bytes.len() != slot.size {
                warn!(
                    "ROM {} is {} bytes, expected {}",
                    slot.name,
                    bytes.len(),
                    slot.size
                );
                return Err(DataError::SizeMismatch {
                    name: slot.name.to_string(),
                    expected: slot.size,
                    actual: bytes.len(),
                }
                .into());
            }
            match slot.kind {
                SlotKind::Program => {
                    set.program[slot.offset..slot.offset + slot.size].copy_from_slice(&bytes)
                }
                SlotKind::Character => set.character = bytes,
                SlotKind::Palette => set.palette = bytes,
                SlotKind::Lookup => set.lookup = bytes,
            }
            debug!("loaded {} ({} bytes)", slot.name, slot.size);
        }

        info!("ROM set loaded ({} bytes)", set.total_bytes());
        Ok(set)
    }

    pub fn program_rom(&self) -> &[u8] {
        &self.program
    }

    pub fn character_rom(&self) -> &[u8] {
        &self.character
    }

    pub fn palette_prom(&self) -> &[u8] {
        &self.palette
    }

    pub fn lookup_prom(&self) -> &[u8] {
        &self.lookup
    }

    /// Palette PROM followed by the lookup PROM, as the board wires them.
    pub fn color_proms(&self) -> Vec<u8> {
        [self.palette.as_slice(), self.lookup.as_slice()].concat()
    }

    pub fn total_bytes(&self) -> usize {
        self.program.len() + self.character.len() + self.palette.len() + self.lookup.len()
    }
}

/// Directories under `root` that look like a Pac-Man set, by name.
pub fn find_rom_sets(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.contains("pacman") {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Board smoke test: fills video RAM with a counter, color RAM with 0x0F,
/// enables the vblank interrupt and halts in a loop.
pub const DIAGNOSTIC_PROGRAM: &[u8] = &[
    0x31, 0x00, 0x50, // LD SP,$5000
    0x21, 0x00, 0x40, // LD HL,$4000
    0x06, 0x04, // LD B,$04
    0x0E, 0x00, // LD C,$00
    0x71, // vram: LD (HL),C
    0x23, // INC HL
    0x0C, // INC C
    0x7C, // LD A,H
    0xFE, 0x44, // CP $44
    0x20, 0xF7, // JR NZ,vram
    0x21, 0x00, 0x44, // LD HL,$4400
    0x06, 0x04, // LD B,$04
    0x0E, 0x0F, // LD C,$0F
    0x71, // cram: LD (HL),C
    0x23, // INC HL
    0x7C, // LD A,H
    0xFE, 0x48, // CP $48
    0x20, 0xF9, // JR NZ,cram
    0x3E, 0x01, // LD A,$01
    0x32, 0x00, 0x50, // LD ($5000),A
    0x76, // main: HALT
    0x18, 0xFD, // JR main
];

/// [`DIAGNOSTIC_PROGRAM`] padded out to a full program ROM image.
pub fn diagnostic_rom() -> Vec<u8> {
    let mut rom = vec![0; ROM_SIZE];
    rom[..DIAGNOSTIC_PROGRAM.len()].copy_from_slice(DIAGNOSTIC_PROGRAM);
    rom
}
