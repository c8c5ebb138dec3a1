use super::palette::{Palette, Rgba};
use super::tiles::{TILE_SIZE, TileSet};

/// Columns of the visible playfield.
pub const TILES_X: usize = 28;
/// Rows of the visible playfield.
pub const TILES_Y: usize = 36;
pub const VIDEO_WIDTH: usize = TILES_X * TILE_SIZE;
pub const VIDEO_HEIGHT: usize = TILES_Y * TILE_SIZE;
pub const LOOKUP_SIZE: usize = 0x100;

/// Host-owned pixel buffer, one packed RGBA `u32` per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color.packed());
    }

    #[inline]
    fn put(&mut self, x: isize, y: isize, pixel: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = pixel;
        }
    }

    /// Pixels as `[r, g, b, a]` bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_be_bytes()).collect()
    }
}

/// How a tile pixel and its attribute byte become a palette index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorLaw {
    /// Every lit pixel takes `palette[attribute & 0x0F]`.
    #[default]
    FlatTileColor,
    /// `lookup[(attribute & 0x1F) * 4 + pixel] & 0x0F`. Falls back to the
    /// flat law while no lookup PROM is loaded.
    LookupProm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositorOptions {
    /// Mirror both axes while the board's flip latch is set.
    pub honor_flip: bool,
    pub color_law: ColorLaw,
}

#[derive(Debug, Clone)]
pub struct TileCompositor {
    palette: Palette,
    tiles: TileSet,
    lookup: Option<Box<[u8; LOOKUP_SIZE]>>,
    options: CompositorOptions,
    frame_count: u64,
}

impl Default for TileCompositor {
    fn default() -> Self {
        Self::new(Palette::DEFAULT, TileSet::test_pattern())
    }
}

impl TileCompositor {
    pub fn new(palette: Palette, tiles: TileSet) -> Self {
        Self {
            palette,
            tiles,
            lookup: None,
            options: CompositorOptions::default(),
            frame_count: 0,
        }
    }

    pub fn with_options(mut self, options: CompositorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CompositorOptions {
        self.options
    }

    pub fn set_options(&mut self, options: CompositorOptions) {
        self.options = options;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn set_tiles(&mut self, tiles: TileSet) {
        self.tiles = tiles;
    }

    /// Install the 256-byte colour lookup PROM. Returns `false` and keeps the
    /// previous table if `prom` has the wrong length.
    pub fn set_lookup(&mut self, prom: &[u8]) -> bool {
        match <[u8; LOOKUP_SIZE]>::try_from(prom) {
            Ok(table) => {
                self.lookup = Some(Box::new(table));
                true
            }
            Err(_) => false,
        }
    }

    pub fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tile_bytes(&self) -> usize {
        self.tiles.byte_size()
    }

    /// Draw the tile layer centered in `fb`.
    ///
    /// `video` and `color` are the column-major planes (`column * 36 + row`).
    /// Bytes missing from a short plane read as zero. Transparent pixels leave
    /// the framebuffer untouched, so callers clear it first if they want a
    /// solid background.
    pub fn render(&mut self, fb: &mut Framebuffer, video: &[u8], color: &[u8], flip: bool) {
        let x_offset = (fb.width() as isize - VIDEO_WIDTH as isize) / 2;
        let y_offset = (fb.height() as isize - VIDEO_HEIGHT as isize) / 2;
        let mirror = flip && self.options.honor_flip;

        for tx in 0..TILES_X {
            for ty in 0..TILES_Y {
                let index = tx * TILES_Y + ty;
                let code = video.get(index).copied().unwrap_or(0);
                let attribute = color.get(index).copied().unwrap_or(0);
                let tile = self.tiles.tile(code);

                for py in 0..TILE_SIZE {
                    for px in 0..TILE_SIZE {
                        let pixel = tile[py * TILE_SIZE + px];
                        if pixel == 0 {
                            continue;
                        }
                        let entry = self.palette_index(attribute, pixel);
                        if entry == 0 {
                            continue;
                        }

                        let (mut sx, mut sy) = (tx * TILE_SIZE + px, ty * TILE_SIZE + py);
                        if mirror {
                            sx = VIDEO_WIDTH - 1 - sx;
                            sy = VIDEO_HEIGHT - 1 - sy;
                        }
                        fb.put(
                            x_offset + sx as isize,
                            y_offset + sy as isize,
                            self.palette.get(entry).packed(),
                        );
                    }
                }
            }
        }

        self.frame_count += 1;
    }

    #[inline]
    fn palette_index(&self, attribute: u8, pixel: u8) -> u8 {
        match (self.options.color_law, &self.lookup) {
            (ColorLaw::LookupProm, Some(lut)) => {
                lut[(attribute as usize & 0x1F) * 4 + (pixel as usize & 0x03)] & 0x0F
            }
            _ => attribute & 0x0F,
        }
    }
}
