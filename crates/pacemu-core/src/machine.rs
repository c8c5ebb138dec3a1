use log::{debug, warn};

use crate::cpu::CpuCore;
use crate::driver::Driver;
use crate::error::Result;
use crate::input::InputSource;
use crate::region::{RegionId, RegionInfo};
use crate::rom::RomSet;
use crate::scheduler::{FrameReport, FrameScheduler, FrameTiming, State};
use crate::video::{CompositorOptions, Framebuffer, Palette, TileCompositor, TileSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub frames: u64,
    pub rendered_frames: u64,
    pub region_bytes: usize,
    pub tile_bytes: usize,
    pub regions: Vec<RegionInfo>,
}

/// Board plus video: the single value a frontend drives.
pub struct Machine<C: CpuCore> {
    scheduler: FrameScheduler<C>,
    compositor: TileCompositor,
}

impl<C: CpuCore> Machine<C> {
    pub fn new(cpu: C) -> Self {
        Self::from_parts(FrameScheduler::new(cpu), TileCompositor::default())
    }

    pub fn from_parts(scheduler: FrameScheduler<C>, compositor: TileCompositor) -> Self {
        Self {
            scheduler,
            compositor,
        }
    }

    pub fn with_timing(mut self, timing: FrameTiming) -> Self {
        self.scheduler = self.scheduler.with_timing(timing);
        self
    }

    pub fn set_options(&mut self, options: CompositorOptions) {
        self.compositor.set_options(options);
    }

    pub fn state(&self) -> State {
        self.scheduler.state()
    }

    pub fn driver(&self) -> &Driver {
        self.scheduler.driver()
    }

    pub fn driver_mut(&mut self) -> &mut Driver {
        self.scheduler.driver_mut()
    }

    pub fn cpu(&self) -> &C {
        self.scheduler.cpu()
    }

    pub fn compositor(&self) -> &TileCompositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut TileCompositor {
        &mut self.compositor
    }

    pub fn start(&mut self, program_rom: &[u8]) -> Result<()> {
        self.scheduler.start(program_rom)
    }

    /// Start from a full ROM set: program ROM on the bus, character ROM and
    /// colour PROMs kept beside it and decoded into the compositor.
    pub fn start_with_rom_set(&mut self, roms: &RomSet) -> Result<()> {
        self.scheduler.start(roms.program_rom())?;

        let driver = self.scheduler.driver_mut();
        let attached = driver
            .attach(RegionId::Graphics, "Character ROM", roms.character_rom())
            .and_then(|()| driver.attach(RegionId::ColorProm, "Color PROMs", &roms.color_proms()));
        if let Err(e) = attached {
            warn!("could not keep graphics ROMs: {e}");
            self.scheduler.stop()?;
            return Err(e);
        }

        let driver = self.scheduler.driver();
        if let Some(chars) = driver.region(RegionId::Graphics) {
            self.compositor.set_tiles(TileSet::from_character_rom(chars));
        }
        if let Some(proms) = driver.region(RegionId::ColorProm) {
            if let Some(palette) = Palette::from_color_prom(proms) {
                self.compositor.set_palette(palette);
            }
            if let Some(lookup) = proms.get(crate::rom::PALETTE_PROM_SIZE..) {
                self.compositor.set_lookup(lookup);
            }
        }
        debug!("graphics decoded from ROM set");
        Ok(())
    }

    pub fn run_frame(&mut self) -> Result<FrameReport> {
        self.scheduler.run_frame()
    }

    pub fn reset(&mut self) -> Result<()> {
        self.scheduler.reset()
    }

    pub fn stop(&mut self) -> Result<()> {
        self.scheduler.stop()
    }

    pub fn update_input(&mut self, source: &mut dyn InputSource) {
        self.scheduler.update_input(source);
    }

    /// Composite the current video/color RAM into `fb`.
    pub fn render(&mut self, fb: &mut Framebuffer) {
        let driver = self.scheduler.driver();
        self.compositor.render(
            fb,
            driver.video_plane(),
            driver.color_plane(),
            driver.flip_screen(),
        );
    }

    /// Bus read without CPU side effects, for debuggers.
    pub fn read_byte(&self, address: u16) -> u8 {
        self.scheduler.driver().read_byte(address)
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.scheduler.driver_mut().write_byte(address, value);
    }

    pub fn stats(&self) -> Stats {
        let driver = self.scheduler.driver();
        let regions = driver.memory().regions();
        Stats {
            frames: driver.frame_count(),
            rendered_frames: self.compositor.frame_count(),
            region_bytes: regions.total_bytes(),
            tile_bytes: self.compositor.tile_bytes(),
            regions: regions.regions().collect(),
        }
    }
}
