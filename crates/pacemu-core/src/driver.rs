use std::ops::RangeInclusive;

use log::{debug, error, info, warn};

use crate::address_space::OPEN_BUS;
use crate::cpu::MemoryBus;
use crate::error::{DataError, Result, StateError};
use crate::input::InputPorts;
use crate::memory::Memory;
use crate::region::{RegionId, RegionLimits};

pub const ROM_SIZE: usize = 0x4000;
pub const VIDEO_RAM_SIZE: usize = 0x400;
pub const COLOR_RAM_SIZE: usize = 0x400;
pub const WORK_RAM_SIZE: usize = 0x800;
pub const SPRITE_COORDS_SIZE: usize = 0x10;

/// Read: player 1 controls and coin. Write: vblank interrupt enable.
pub const REG_IN0_IRQ_ENABLE: u16 = 0x5000;
pub const REG_FLIP_SCREEN: u16 = 0x5003;
/// Read: player 2 controls and start buttons.
pub const REG_IN1: u16 = 0x5040;
pub const REG_DSW1: u16 = 0x5080;
pub const REG_DSW2: u16 = 0x50C0;
pub const SPRITE_COORDS: RangeInclusive<u16> = 0x5060..=0x506F;

/// Decoded areas of the board's bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    Rom,
    VideoRam,
    ColorRam,
    WorkRam,
    Io,
}

/// Bus decode in priority order. Addresses past the last window are open bus.
static WINDOWS: [(RangeInclusive<u16>, Window); 5] = [
    (0x0000..=0x3FFF, Window::Rom),
    (0x4000..=0x43FF, Window::VideoRam),
    (0x4400..=0x47FF, Window::ColorRam),
    (0x4800..=0x4FFF, Window::WorkRam),
    (0x5000..=0x50FF, Window::Io),
];

pub fn windows() -> &'static [(RangeInclusive<u16>, Window)] {
    &WINDOWS
}

#[inline]
pub fn window_for(address: u16) -> Option<Window> {
    WINDOWS
        .iter()
        .find(|(range, _)| range.contains(&address))
        .map(|&(_, window)| window)
}

struct Block {
    id: RegionId,
    name: &'static str,
    start: u16,
    end: u16,
    read_only: bool,
}

impl Block {
    fn size(&self) -> usize {
        self.end as usize - self.start as usize + 1
    }
}

const LAYOUT: [Block; 4] = [
    Block {
        id: RegionId::ProgramRom,
        name: "Pac-Man ROM",
        start: 0x0000,
        end: 0x3FFF,
        read_only: true,
    },
    Block {
        id: RegionId::VideoRam,
        name: "Video RAM",
        start: 0x4000,
        end: 0x43FF,
        read_only: false,
    },
    Block {
        id: RegionId::ColorRam,
        name: "Color RAM",
        start: 0x4400,
        end: 0x47FF,
        read_only: false,
    },
    Block {
        id: RegionId::WorkRam,
        name: "RAM",
        start: 0x4800,
        end: 0x4FFF,
        read_only: false,
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub online: bool,
    pub regions: usize,
    pub region_bytes: usize,
    pub mapped_pages: usize,
    pub frame_count: u64,
}

/// Pac-Man board hardware: memory regions, device registers and latches.
#[derive(Debug, Default)]
pub struct Driver {
    memory: Memory,
    online: bool,
    interrupt_enable: bool,
    flip_screen: bool,
    sprite_coords: [u8; SPRITE_COORDS_SIZE],
    frame_count: u64,
    input: InputPorts,
    dsw1: u8,
    dsw2: u8,
}

impl Driver {
    /// An uninitialized board. Nothing is allocated until [`Driver::init`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: RegionLimits) -> Self {
        let mut driver = Self::new();
        driver.set_limits(limits);
        driver
    }

    pub fn set_limits(&mut self, limits: RegionLimits) {
        self.memory.regions_mut().set_limits(limits);
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Allocate and map the four board regions.
    ///
    /// On failure every region allocated so far is released, leaving the
    /// driver exactly as uninitialized as before the call.
    pub fn init(&mut self) -> Result<()> {
        if self.online {
            warn!("driver already initialized");
            return Ok(());
        }

        if let Err(e) = self.try_init() {
            error!("driver init failed: {e}");
            self.release_all();
            return Err(e);
        }

        self.online = true;
        self.restore_defaults();
        self.input = InputPorts::IDLE;
        self.dsw1 = 0x00;
        self.dsw2 = 0x00;
        for block in &LAYOUT {
            debug!(
                "  {:<12} ${:04X}-${:04X} ({} bytes)",
                block.name,
                block.start,
                block.end,
                block.size()
            );
        }
        info!("Pac-Man driver initialized");
        Ok(())
    }

    fn try_init(&mut self) -> Result<()> {
        for block in &LAYOUT {
            self.memory
                .regions_mut()
                .allocate(block.id, block.size(), block.name)?;
        }
        for block in &LAYOUT {
            let mapped = self
                .memory
                .map_range(block.start, block.end, block.id, block.read_only);
            if let Err(e) = mapped {
                // the layout is fixed, so this is a decoding bug
                debug_assert!(false, "board layout rejected: {e}");
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Free every region and forget all state. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.online {
            info!("shutting down Pac-Man driver");
        }
        self.release_all();
        self.online = false;
        self.restore_defaults();
        self.input = InputPorts::IDLE;
        self.dsw1 = 0x00;
        self.dsw2 = 0x00;
    }

    fn release_all(&mut self) {
        self.memory.unmap_all();
        let live: Vec<RegionId> = self.memory.regions().regions().map(|r| r.id).collect();
        for id in live {
            self.memory.regions_mut().free(id);
        }
    }

    /// Clear RAM and board latches. ROM contents and input ports survive.
    pub fn reset(&mut self) {
        info!("resetting Pac-Man board");
        for id in [RegionId::VideoRam, RegionId::ColorRam, RegionId::WorkRam] {
            self.memory.regions_mut().clear(id);
        }
        self.restore_defaults();
    }

    fn restore_defaults(&mut self) {
        self.interrupt_enable = false;
        self.flip_screen = false;
        self.frame_count = 0;
        self.sprite_coords = [0; SPRITE_COORDS_SIZE];
    }

    /// Copy a full 16 KiB program image into ROM.
    pub fn load_program_rom(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.online {
            return Err(StateError::DriverOffline.into());
        }
        if bytes.len() != ROM_SIZE {
            warn!("program ROM is {} bytes, expected {ROM_SIZE}", bytes.len());
            return Err(DataError::SizeMismatch {
                name: "program rom".to_string(),
                expected: ROM_SIZE,
                actual: bytes.len(),
            }
            .into());
        }
        self.memory
            .regions_mut()
            .load(RegionId::ProgramRom, 0, bytes);
        debug!("loaded {ROM_SIZE} bytes of program ROM");
        Ok(())
    }

    /// Keep an unmapped image (character ROM, PROMs) alongside the board
    /// regions. It is released together with them on shutdown.
    pub fn attach(&mut self, id: RegionId, name: &'static str, bytes: &[u8]) -> Result<()> {
        if !self.online {
            return Err(StateError::DriverOffline.into());
        }
        let regions = self.memory.regions_mut();
        regions.allocate(id, bytes.len(), name)?;
        regions.load(id, 0, bytes);
        Ok(())
    }

    pub fn region(&self, id: RegionId) -> Option<&[u8]> {
        self.memory.regions().get_base(id)
    }

    pub fn update_input(&mut self, port0: u8, port1: u8) {
        self.input = InputPorts {
            in0: port0,
            in1: port1,
        };
    }

    pub fn set_input_ports(&mut self, ports: InputPorts) {
        self.input = ports;
    }

    pub fn input_ports(&self) -> InputPorts {
        self.input
    }

    pub fn set_dip_switches(&mut self, dsw1: u8, dsw2: u8) {
        self.dsw1 = dsw1;
        self.dsw2 = dsw2;
    }

    pub fn dip_switches(&self) -> (u8, u8) {
        (self.dsw1, self.dsw2)
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enable
    }

    pub fn flip_screen(&self) -> bool {
        self.flip_screen
    }

    pub fn sprite_coords(&self) -> &[u8; SPRITE_COORDS_SIZE] {
        &self.sprite_coords
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub(crate) fn advance_frame(&mut self) -> u64 {
        self.frame_count += 1;
        self.frame_count
    }

    /// Tile codes, column-major. Empty while the driver is offline.
    pub fn video_plane(&self) -> &[u8] {
        self.region(RegionId::VideoRam).unwrap_or(&[])
    }

    /// Tile attributes, same layout as [`Driver::video_plane`].
    pub fn color_plane(&self) -> &[u8] {
        self.region(RegionId::ColorRam).unwrap_or(&[])
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn stats(&self) -> DriverStats {
        let regions = self.memory.regions();
        DriverStats {
            online: self.online,
            regions: regions.live_count(),
            region_bytes: regions.total_bytes(),
            mapped_pages: self.memory.map().mapped_pages(),
            frame_count: self.frame_count,
        }
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        match window_for(address) {
            Some(Window::Io) => self.read_io(address),
            Some(_) => self.memory.read_byte(address),
            None => OPEN_BUS,
        }
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        match window_for(address) {
            Some(Window::Rom) | None => {}
            Some(Window::Io) => self.write_io(address, value),
            Some(_) => self.memory.write_byte(address, value),
        }
    }

    fn read_io(&self, address: u16) -> u8 {
        if !self.online {
            return OPEN_BUS;
        }
        match address {
            REG_IN0_IRQ_ENABLE => self.input.in0,
            REG_IN1 => self.input.in1,
            REG_DSW1 => self.dsw1,
            REG_DSW2 => self.dsw2,
            _ => OPEN_BUS,
        }
    }

    fn write_io(&mut self, address: u16, value: u8) {
        if !self.online {
            return;
        }
        #[cfg(feature = "io-trace")]
        log::trace!("io write ${address:04X} <- {value:02X}");
        match address {
            REG_IN0_IRQ_ENABLE => self.interrupt_enable = value & 1 != 0,
            REG_FLIP_SCREEN => self.flip_screen = value & 1 != 0,
            a if SPRITE_COORDS.contains(&a) => {
                self.sprite_coords[(a - SPRITE_COORDS.start()) as usize] = value;
            }
            _ => {}
        }
    }
}

impl MemoryBus for Driver {
    fn read_byte(&mut self, address: u16) -> u8 {
        Driver::read_byte(self, address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        Driver::write_byte(self, address, value);
    }
}
